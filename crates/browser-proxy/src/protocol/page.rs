// Page - A navigable page within a browser context
//
// Each navigation asks the context's ProxyRouter for a fresh connection plan,
// opens the connection it describes and fetches the document over it.

use crate::error::{Error, Result};
use crate::protocol::Response;
use crate::routing::ProxyRouter;
use crate::server::{connector, http_client};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use url::Url;

/// Page represents a page within a browser context.
///
/// A Page is created by [`BrowserContext::new_page()`](crate::protocol::BrowserContext::new_page)
/// or [`Browser::new_page()`](crate::protocol::Browser::new_page). Pages share
/// their context's proxy configuration; each navigation is routed independently.
///
/// Pages start at "about:blank".
///
/// # Example
///
/// ```ignore
/// use browser_proxy::{Browser, BrowserContextOptions, LaunchOptions, ProxySettings};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let browser = Browser::launch_with_options(
///         LaunchOptions::new().proxy(ProxySettings::new("127.0.0.1:8888")),
///     )?;
///     let page = browser.new_page()?;
///     assert_eq!(page.url(), "about:blank");
///
///     let response = page.goto("http://non-existent.com/target.html", None).await?;
///     assert!(response.unwrap().ok());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Page {
    inner: Arc<PageInner>,
}

struct PageInner {
    router: ProxyRouter,
    default_timeout: Duration,
    url: RwLock<String>,
    closed: AtomicBool,
}

impl Page {
    pub(crate) fn new(router: ProxyRouter, default_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(PageInner {
                router,
                default_timeout,
                url: RwLock::new("about:blank".to_string()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the URL of the last committed navigation
    pub fn url(&self) -> String {
        self.inner.url.read().clone()
    }

    /// Router used for this page's outbound connections
    pub fn router(&self) -> &ProxyRouter {
        &self.inner.router
    }

    /// Closes the page. Further navigations fail with `TargetClosed`.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Navigates to the specified URL.
    ///
    /// Returns `None` for URLs that don't produce responses (`about:blank`,
    /// `data:` URLs).
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to navigate to
    /// * `options` - Optional navigation options (timeout)
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The page is closed
    /// - URL is invalid or uses a scheme other than `http`
    /// - Navigation timeout (options, then context default, then 30s; zero
    ///   disables the deadline)
    /// - The proxy is unreachable, refuses the tunnel or rejects authentication
    /// - A direct connection (bypassed host or no proxy) fails
    pub async fn goto(&self, url: &str, options: Option<GotoOptions>) -> Result<Option<Response>> {
        if self.is_closed() {
            return Err(Error::TargetClosed {
                target_type: "Page".to_string(),
                context: format!("Cannot navigate to '{}'", url),
            });
        }

        let target = Url::parse(url)
            .map_err(|e| Error::InvalidArgument(format!("Invalid URL '{}': {}", url, e)))?;

        match target.scheme() {
            "http" => {}
            "about" | "data" => {
                *self.inner.url.write() = target.to_string();
                return Ok(None);
            }
            other => {
                return Err(Error::InvalidArgument(format!(
                    "Unsupported URL scheme '{}' in '{}': only http:// navigations are supported",
                    other, url
                )));
            }
        }

        let timeout = options
            .and_then(|o| o.timeout)
            .unwrap_or(self.inner.default_timeout);

        let navigation = async {
            let connection = connector::connect(&self.inner.router, &target).await?;
            let response = http_client::get(connection.stream, &target).await?;
            Ok::<_, Error>(Response::new(target.to_string(), connection.plan, response))
        };

        // Zero disables the deadline. Dropping `navigation` on expiry closes
        // the in-flight socket.
        let response = if timeout.is_zero() {
            navigation.await?
        } else {
            tokio::time::timeout(timeout, navigation)
                .await
                .map_err(|_| Error::NavigationTimeout {
                    url: url.to_string(),
                    duration_ms: saturating_millis(timeout),
                })??
        };

        *self.inner.url.write() = response.url().to_string();
        Ok(Some(response))
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Milliseconds in `duration`, saturating at `u64::MAX`
fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Options for page.goto()
#[derive(Debug, Clone, Default)]
pub struct GotoOptions {
    /// Maximum operation time (`Duration::ZERO` disables the timeout)
    pub timeout: Option<Duration>,
}

impl GotoOptions {
    /// Creates new GotoOptions with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout. Pass `Duration::ZERO` to disable it.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
