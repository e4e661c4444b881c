// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Browser - Owner of the process-wide (launch-level) proxy
//
// The launch-level proxy is validated once and fixed for the browser's
// lifetime. Contexts inherit it or override it; overriding requires it.

use crate::api::LaunchOptions;
use crate::api::launch_options::millis_to_duration;
use crate::error::{Error, Result};
use crate::protocol::{BrowserContext, BrowserContextOptions, Page};
use crate::routing::ProxyConfig;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Browser represents a browser instance.
///
/// A Browser is created with [`Browser::launch`] or
/// [`Browser::launch_with_options`]. It provides methods to create browser
/// contexts and pages.
///
/// # Example
///
/// ```ignore
/// use browser_proxy::{Browser, LaunchOptions, ProxySettings};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let browser = Browser::launch_with_options(
///         LaunchOptions::new().proxy(ProxySettings::new("socks5://127.0.0.1:1080")),
///     )?;
///     assert!(browser.is_connected());
///
///     // Convenience: create page directly (auto-creates default context)
///     let page = browser.new_page()?;
///     page.goto("http://example.com/", None).await?;
///
///     browser.close();
///     assert!(!browser.is_connected());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Browser {
    inner: Arc<BrowserInner>,
}

struct BrowserInner {
    global_proxy: Option<Arc<ProxyConfig>>,
    default_timeout: Duration,
    contexts: Mutex<Vec<BrowserContext>>,
    is_connected: AtomicBool,
}

impl Browser {
    /// Launches a browser without a proxy
    pub fn launch() -> Result<Self> {
        Self::launch_with_options(LaunchOptions::default())
    }

    /// Launches a browser with the given options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the launch-level proxy is invalid
    /// ([`Error::InvalidProxyServer`], [`Error::InvalidCredentials`]).
    pub fn launch_with_options(options: LaunchOptions) -> Result<Self> {
        let global_proxy = options
            .proxy
            .as_ref()
            .map(ProxyConfig::from_settings)
            .transpose()?
            .map(Arc::new);

        if let Some(proxy) = &global_proxy {
            tracing::debug!(proxy = %proxy.sanitized_server(), "Launching browser with global proxy");
        }

        Ok(Self {
            inner: Arc::new(BrowserInner {
                global_proxy,
                default_timeout: options.default_timeout(),
                contexts: Mutex::new(Vec::new()),
                is_connected: AtomicBool::new(true),
            }),
        })
    }

    /// Launch-level proxy, if the browser was launched with one
    pub fn proxy(&self) -> Option<&Arc<ProxyConfig>> {
        self.inner.global_proxy.as_ref()
    }

    /// Returns true if the browser has not been closed
    pub fn is_connected(&self) -> bool {
        self.inner.is_connected.load(Ordering::SeqCst)
    }

    /// Creates a new browser context inheriting the launch-level proxy.
    pub fn new_context(&self) -> Result<BrowserContext> {
        self.new_context_with_options(BrowserContextOptions::default())
    }

    /// Creates a new browser context with custom options.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidProxyServer`] if `options.proxy.server` cannot be parsed
    /// - [`Error::MissingGlobalProxy`] if a proxy is given but the browser was
    ///   launched without one
    /// - [`Error::InvalidCredentials`] if only one of username/password is set
    /// - [`Error::TargetClosed`] if the browser has been closed
    pub fn new_context_with_options(&self, options: BrowserContextOptions) -> Result<BrowserContext> {
        if !self.is_connected() {
            return Err(Error::TargetClosed {
                target_type: "Browser".to_string(),
                context: "Cannot create a context after close()".to_string(),
            });
        }

        let proxy =
            ProxyConfig::resolve_for_context(options.proxy.as_ref(), self.inner.global_proxy.as_ref())?;
        let default_timeout = options
            .navigation_timeout
            .map(millis_to_duration)
            .unwrap_or(self.inner.default_timeout);

        let context = BrowserContext::new(proxy, default_timeout);
        let mut contexts = self.inner.contexts.lock();
        // Drop contexts closed since the last call so the list stays bounded
        contexts.retain(|c| !c.is_closed());
        contexts.push(context.clone());
        Ok(context)
    }

    /// Creates a new page in a new default context.
    pub fn new_page(&self) -> Result<Page> {
        self.new_context()?.new_page()
    }

    /// Returns all open contexts
    pub fn contexts(&self) -> Vec<BrowserContext> {
        self.inner
            .contexts
            .lock()
            .iter()
            .filter(|c| !c.is_closed())
            .cloned()
            .collect()
    }

    /// Closes the browser and all of its contexts and pages.
    pub fn close(&self) {
        self.inner.is_connected.store(false, Ordering::SeqCst);
        let contexts = std::mem::take(&mut *self.inner.contexts.lock());
        for context in contexts {
            context.close();
        }
    }
}

impl std::fmt::Debug for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Browser")
            .field("proxy", &self.proxy().map(|p| p.sanitized_server()))
            .field("is_connected", &self.is_connected())
            .finish()
    }
}
