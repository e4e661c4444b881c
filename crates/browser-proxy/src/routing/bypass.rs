//! Proxy bypass rules
//!
//! Parses the comma-separated `proxy.bypass` value into [`BypassRule`]s and
//! decides whether a target host should skip the proxy and connect directly.
//!
//! Rule forms:
//! - `.example.com` matches `example.com` and every subdomain of it
//! - `*.example.com` is an alias for `.example.com`
//! - `example.com` matches that exact host only
//! - `*` matches every host
//!
//! Matching is case-insensitive. The dot boundary is mandatory for domain
//! rules, so `.another.test` never matches `xanother.test`.

use std::fmt;
use url::Host;

/// One normalized bypass pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BypassRule {
    /// Exact host match (`example.com`, `10.0.0.1`, `[::1]`)
    Exact(String),
    /// Domain and all of its subdomains (`.example.com`)
    Domain(String),
    /// Every host (`*`)
    Any,
}

impl BypassRule {
    /// Parses a single bypass entry.
    ///
    /// Returns `None` for entries that are empty after trimming.
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }
        if entry == "*" {
            return Some(BypassRule::Any);
        }

        let lowered = entry.to_lowercase();
        let (is_domain, rest) = if let Some(rest) = lowered.strip_prefix("*.") {
            (true, rest)
        } else if let Some(rest) = lowered.strip_prefix('.') {
            (true, rest)
        } else {
            (false, lowered.as_str())
        };

        let host = normalize_host(rest);
        if host.is_empty() {
            return None;
        }

        Some(if is_domain {
            BypassRule::Domain(host)
        } else {
            BypassRule::Exact(host)
        })
    }

    /// Tests an already-normalized host against this rule
    fn matches_normalized(&self, host: &str) -> bool {
        match self {
            BypassRule::Any => true,
            BypassRule::Exact(exact) => host == exact,
            BypassRule::Domain(domain) => {
                if host == domain {
                    return true;
                }
                // Require "." immediately before the domain suffix
                host.len() > domain.len()
                    && host.ends_with(domain.as_str())
                    && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
            }
        }
    }

    /// Tests `host` against this rule (case-insensitive)
    pub fn matches(&self, host: &str) -> bool {
        self.matches_normalized(&normalize_host(host))
    }
}

impl fmt::Display for BypassRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BypassRule::Exact(host) => write!(f, "{}", host),
            BypassRule::Domain(domain) => write!(f, ".{}", domain),
            BypassRule::Any => write!(f, "*"),
        }
    }
}

/// Lowercases a host and strips IPv6 brackets and a trailing FQDN dot.
///
/// Internationalized names are converted to their ASCII (punycode) form,
/// the form `Url::host_str()` reports for navigation targets.
pub(crate) fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    let host = host.strip_suffix('.').unwrap_or(host);
    if !host.is_ascii() {
        if let Ok(Host::Domain(ascii)) = Host::parse(host) {
            return ascii;
        }
    }
    host.to_lowercase()
}

/// Returns true if any rule matches `host`.
///
/// Union semantics: rules never override each other, so evaluation order
/// does not affect the result.
pub fn matches(host: &str, rules: &[BypassRule]) -> bool {
    let host = normalize_host(host);
    rules.iter().any(|rule| rule.matches_normalized(&host))
}

/// Ordered set of bypass rules parsed from a `proxy.bypass` string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BypassMatcher {
    rules: Vec<BypassRule>,
}

impl BypassMatcher {
    /// Creates an empty matcher that bypasses nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated bypass list.
    ///
    /// Entries are trimmed and empty entries are skipped.
    pub fn parse(list: &str) -> Self {
        let rules = list.split(',').filter_map(BypassRule::parse).collect();
        Self { rules }
    }

    /// The parsed rules in declaration order
    pub fn rules(&self) -> &[BypassRule] {
        &self.rules
    }

    /// True when no rules are configured
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True if `host` should be reached directly instead of through the proxy
    pub fn matches(&self, host: &str) -> bool {
        matches(host, &self.rules)
    }
}

impl FromIterator<BypassRule> for BypassMatcher {
    fn from_iter<I: IntoIterator<Item = BypassRule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}
