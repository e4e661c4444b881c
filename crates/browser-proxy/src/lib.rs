//! browser-proxy: Proxy routing for browser automation
//!
//! This crate decides, for every outbound connection a page makes, whether to
//! go direct or through the configured HTTP or SOCKS5 proxy, and then opens
//! that connection (answering proxy authentication challenges once).
//!
//! # Examples
//!
//! ## Launch-level proxy with a bypass list
//!
//! ```ignore
//! use browser_proxy::{Browser, LaunchOptions, ProxySettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let browser = Browser::launch_with_options(
//!         LaunchOptions::new().proxy(
//!             ProxySettings::new("127.0.0.1:8888")
//!                 .bypass("1.non.existent.domain.for.the.test, .another.test"),
//!         ),
//!     )?;
//!     let page = browser.new_page()?;
//!
//!     // Routed through the proxy
//!     let response = page
//!         .goto("http://0.non.existent.domain.for.the.test/target.html", None)
//!         .await?
//!         .expect("http navigations produce a response");
//!     assert!(!response.connection_plan().is_direct());
//!
//!     // Bypassed: connects directly (and fails, the host does not exist)
//!     assert!(page
//!         .goto("http://foo.is.the.another.test/target.html", None)
//!         .await
//!         .is_err());
//!
//!     browser.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Per-context proxies
//!
//! ```ignore
//! use browser_proxy::{Browser, BrowserContextOptions, LaunchOptions, ProxySettings};
//!
//! # fn main() -> browser_proxy::Result<()> {
//! // A launch-level proxy must exist before contexts may override it
//! let browser = Browser::launch_with_options(
//!     LaunchOptions::new().proxy(ProxySettings::new("http://per-context")),
//! )?;
//! let context = browser.new_context_with_options(
//!     BrowserContextOptions::builder()
//!         .proxy(
//!             ProxySettings::new("http://127.0.0.1:3128")
//!                 .username("user")
//!                 .password("secret"),
//!         )
//!         .build(),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Routing decisions without a browser
//!
//! ```ignore
//! use browser_proxy::routing::{plan_for, ConnectionPlan, ProxyConfig};
//! use browser_proxy::ProxySettings;
//!
//! let config = ProxyConfig::from_settings(
//!     &ProxySettings::new("socks5://proxy:1080").bypass(".internal.test"),
//! )?;
//! let plan = plan_for(&"http://api.internal.test/".parse()?, Some(&config))?;
//! assert_eq!(plan, ConnectionPlan::Direct);
//! ```

// Transport layer (exposed for integration tests)
#[doc(hidden)]
pub mod server;

pub mod api;
mod error;
pub mod protocol;
pub mod routing;

/// Default navigation timeout in milliseconds.
///
/// Applies when neither the launch options nor the context override it.
pub const DEFAULT_TIMEOUT_MS: f64 = 30000.0;

// Re-export error types
pub use error::{Error, Result};

// Re-export browser API
pub use protocol::{Browser, BrowserContext, GotoOptions, Page, Response};

// Re-export configuration types
pub use protocol::{BrowserContextOptions, ProxySettings};

// Re-export routing entry points
pub use routing::{ConnectionPlan, ProxyConfig, ProxyRouter};

// Re-export launch options
pub use api::LaunchOptions;
