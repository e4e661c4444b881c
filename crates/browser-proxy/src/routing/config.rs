// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// ProxyConfig - Validated, immutable proxy configuration
//
// Built once per browser (global proxy) or once per context (override) from
// raw ProxySettings. Shared read-only between every page of its scope.

use crate::error::{Error, Result};
use crate::protocol::ProxySettings;
use crate::routing::bypass::BypassMatcher;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STD;
use std::fmt;
use std::net::Ipv6Addr;
use std::sync::Arc;
use url::{Host, Url};

/// Default port for an HTTP proxy declared without one
pub const DEFAULT_HTTP_PROXY_PORT: u16 = 80;

/// Default port for a SOCKS5 proxy declared without one
pub const DEFAULT_SOCKS5_PROXY_PORT: u16 = 1080;

/// Proxy protocol selected by the server scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyScheme {
    /// Plain HTTP proxy, tunnelled with `CONNECT`
    Http,
    /// SOCKS5 proxy (RFC 1928)
    Socks5,
}

impl ProxyScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyScheme::Http => "http",
            ProxyScheme::Socks5 => "socks5",
        }
    }

    /// Port used when the server value carries none
    pub fn default_port(&self) -> u16 {
        match self {
            ProxyScheme::Http => DEFAULT_HTTP_PROXY_PORT,
            ProxyScheme::Socks5 => DEFAULT_SOCKS5_PROXY_PORT,
        }
    }
}

/// Parsed `proxy.server` value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyServer {
    scheme: ProxyScheme,
    /// Lowercased host; IPv6 addresses are stored without brackets
    host: String,
    port: Option<u16>,
}

impl ProxyServer {
    /// Parses `scheme://host[:port]` or `host:port`.
    ///
    /// A missing scheme means HTTP. A missing port is accepted; the scheme's
    /// default port is used at connect time.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidProxyServer(
                "proxy.server: must not be empty".to_string(),
            ));
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };

        let url = Url::parse(&with_scheme).map_err(|e| {
            Error::InvalidProxyServer(format!("proxy.server: unable to parse '{}': {}", raw, e))
        })?;

        let scheme = match url.scheme() {
            "http" => ProxyScheme::Http,
            "socks5" => ProxyScheme::Socks5,
            other => {
                return Err(Error::InvalidProxyServer(format!(
                    "proxy.server: unsupported proxy scheme '{}' in '{}'",
                    other, raw
                )));
            }
        };

        if !url.username().is_empty() || url.password().is_some() {
            return Err(Error::InvalidProxyServer(
                "proxy.server: credentials must be passed via proxy.username and proxy.password"
                    .to_string(),
            ));
        }

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_lowercase(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            _ => {
                return Err(Error::InvalidProxyServer(format!(
                    "proxy.server: missing host in '{}'",
                    raw
                )));
            }
        };

        Ok(Self {
            scheme,
            host,
            port: url.port(),
        })
    }

    pub fn scheme(&self) -> ProxyScheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port as written in the server value, if any
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Port to connect to, falling back to the scheme default
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }

    /// `host:port` suitable for `TcpStream::connect`, bracketing IPv6 hosts
    pub fn authority(&self) -> String {
        format!("{}:{}", bracket_ipv6(&self.host), self.effective_port())
    }
}

impl fmt::Display for ProxyServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme.as_str(), bracket_ipv6(&self.host))?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        Ok(())
    }
}

fn bracket_ipv6(host: &str) -> String {
    if host.parse::<Ipv6Addr>().is_ok() {
        format!("[{}]", host)
    } else {
        host.to_string()
    }
}

/// Username/password pair for proxy authentication
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// `Proxy-Authorization` header value using the Basic scheme
    pub fn basic_authorization(&self) -> String {
        let encoded = BASE64_STD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", encoded)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Validated proxy configuration for one scope (browser or context).
///
/// Immutable once built; contexts and pages share it through an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    server: ProxyServer,
    credentials: Option<Credentials>,
    bypass: BypassMatcher,
}

impl ProxyConfig {
    /// Validates raw settings into a config.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidProxyServer`] if the server value cannot be parsed
    /// - [`Error::InvalidCredentials`] if only one of username/password is set
    pub fn from_settings(settings: &ProxySettings) -> Result<Self> {
        let server = ProxyServer::parse(&settings.server)?;
        Self::with_server(server, settings)
    }

    fn with_server(server: ProxyServer, settings: &ProxySettings) -> Result<Self> {
        let credentials = match (&settings.username, &settings.password) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            (None, None) => None,
            (Some(_), None) => {
                return Err(Error::InvalidCredentials(
                    "proxy.username was provided without proxy.password".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(Error::InvalidCredentials(
                    "proxy.password was provided without proxy.username".to_string(),
                ));
            }
        };

        let bypass = settings
            .bypass
            .as_deref()
            .map(BypassMatcher::parse)
            .unwrap_or_default();

        Ok(Self {
            server,
            credentials,
            bypass,
        })
    }

    /// Resolves the proxy a new context should use.
    ///
    /// A context override requires a launch-level proxy; without an override the
    /// context inherits the global proxy (which may itself be absent).
    ///
    /// Checks run in order: server shape, global proxy presence, credentials.
    pub fn resolve_for_context(
        context: Option<&ProxySettings>,
        global: Option<&Arc<ProxyConfig>>,
    ) -> Result<Option<Arc<ProxyConfig>>> {
        let Some(settings) = context else {
            return Ok(global.cloned());
        };

        let server = ProxyServer::parse(&settings.server)?;
        if global.is_none() {
            return Err(Error::MissingGlobalProxy);
        }

        Ok(Some(Arc::new(Self::with_server(server, settings)?)))
    }

    pub fn server(&self) -> &ProxyServer {
        &self.server
    }

    pub fn scheme(&self) -> ProxyScheme {
        self.server.scheme()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn bypass(&self) -> &BypassMatcher {
        &self.bypass
    }

    /// Server rendered for logs, with credentials masked
    pub fn sanitized_server(&self) -> String {
        match self.credentials {
            Some(_) => {
                let server = self.server.to_string();
                let scheme = self.server.scheme().as_str();
                let rest = server
                    .strip_prefix(scheme)
                    .and_then(|s| s.strip_prefix("://"))
                    .unwrap_or(&server);
                format!("{}://***:***@{}", scheme, rest)
            }
            None => self.server.to_string(),
        }
    }
}

impl TryFrom<&ProxySettings> for ProxyConfig {
    type Error = Error;

    fn try_from(settings: &ProxySettings) -> Result<Self> {
        Self::from_settings(settings)
    }
}
