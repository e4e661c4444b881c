// BrowserContext - Isolated session sharing one proxy configuration
//
// A context resolves its proxy once, at creation, from its own options and
// the browser's launch-level proxy. Every page it creates routes through
// that same immutable configuration.

use crate::error::{Error, Result};
use crate::protocol::{Page, ProxySettings};
use crate::routing::{ProxyConfig, ProxyRouter};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// BrowserContext represents an isolated browser session.
///
/// Pages in one context share the context's proxy; separate contexts can use
/// different proxies, provided the browser was launched with a global proxy.
///
/// # Example
///
/// ```ignore
/// use browser_proxy::{Browser, BrowserContextOptions, LaunchOptions, ProxySettings};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Per-context proxies need a launch-level proxy; the value is a placeholder
///     // when every context overrides it.
///     let browser = Browser::launch_with_options(
///         LaunchOptions::new().proxy(ProxySettings::new("http://per-context")),
///     )?;
///
///     let context = browser.new_context_with_options(
///         BrowserContextOptions::builder()
///             .proxy(ProxySettings::new("127.0.0.1:8888").bypass(".internal.test"))
///             .build(),
///     )?;
///
///     let page1 = context.new_page()?;
///     let page2 = context.new_page()?;
///     assert_eq!(context.pages().len(), 2);
///
///     context.close();
///     assert!(page1.is_closed() && page2.is_closed());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BrowserContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    router: ProxyRouter,
    default_timeout: Duration,
    /// All pages created in this context
    pages: Mutex<Vec<Page>>,
    closed: AtomicBool,
}

impl BrowserContext {
    /// Creates a context with an already-resolved proxy configuration
    pub(crate) fn new(proxy: Option<Arc<ProxyConfig>>, default_timeout: Duration) -> Self {
        if let Some(proxy) = &proxy {
            tracing::debug!(
                proxy = %proxy.sanitized_server(),
                bypass_rules = proxy.bypass().rules().len(),
                "Created browser context with proxy"
            );
        }
        Self {
            inner: Arc::new(ContextInner {
                router: ProxyRouter::new(proxy),
                default_timeout,
                pages: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Creates a new page in this context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TargetClosed`] if the context has been closed.
    pub fn new_page(&self) -> Result<Page> {
        if self.is_closed() {
            return Err(Error::TargetClosed {
                target_type: "BrowserContext".to_string(),
                context: "Cannot create a page in a closed context".to_string(),
            });
        }

        let page = Page::new(self.inner.router.clone(), self.inner.default_timeout);
        let mut pages = self.inner.pages.lock();
        // Drop pages closed since the last call so the list stays bounded
        pages.retain(|p| !p.is_closed());
        pages.push(page.clone());
        Ok(page)
    }

    /// Returns all open pages in the context.
    pub fn pages(&self) -> Vec<Page> {
        self.inner
            .pages
            .lock()
            .iter()
            .filter(|page| !page.is_closed())
            .cloned()
            .collect()
    }

    /// Proxy configuration shared by every page of this context
    pub fn proxy(&self) -> Option<&Arc<ProxyConfig>> {
        self.inner.router.config()
    }

    /// Router shared by every page of this context
    pub fn router(&self) -> &ProxyRouter {
        &self.inner.router
    }

    /// Closes the browser context and all its pages.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        let pages = std::mem::take(&mut *self.inner.pages.lock());
        for page in pages {
            page.close();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for BrowserContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserContext")
            .field("proxy", &self.proxy().map(|p| p.sanitized_server()))
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Options for creating a new browser context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserContextOptions {
    /// Network proxy settings overriding the browser's launch-level proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxySettings>,

    /// Default navigation timeout for pages of this context, in milliseconds (0 disables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation_timeout: Option<f64>,
}

impl BrowserContextOptions {
    /// Creates a new builder for BrowserContextOptions
    pub fn builder() -> BrowserContextOptionsBuilder {
        BrowserContextOptionsBuilder::default()
    }

    /// Builds options from an untyped JSON option bag.
    ///
    /// The `proxy` member is validated field by field, so a non-string
    /// `proxy.server` is reported as `proxy.server: expected string, got ...`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let proxy = match value.get("proxy") {
            None | Some(Value::Null) => None,
            Some(proxy) => Some(ProxySettings::from_value(proxy)?),
        };

        let navigation_timeout = match value.get("navigationTimeout") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(_) => {
                return Err(Error::InvalidArgument(
                    "navigationTimeout: expected number".to_string(),
                ));
            }
        };

        Ok(Self {
            proxy,
            navigation_timeout,
        })
    }
}

/// Builder for BrowserContextOptions
#[derive(Debug, Clone, Default)]
pub struct BrowserContextOptionsBuilder {
    proxy: Option<ProxySettings>,
    navigation_timeout: Option<f64>,
}

impl BrowserContextOptionsBuilder {
    /// Sets the network proxy for this context
    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets the default navigation timeout in milliseconds. Pass 0 to disable timeout.
    pub fn navigation_timeout(mut self, ms: f64) -> Self {
        self.navigation_timeout = Some(ms);
        self
    }

    /// Builds the BrowserContextOptions
    pub fn build(self) -> BrowserContextOptions {
        BrowserContextOptions {
            proxy: self.proxy,
            navigation_timeout: self.navigation_timeout,
        }
    }
}
