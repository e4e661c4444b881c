// Error types for browser-proxy

use thiserror::Error;

/// Result type alias for browser-proxy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring proxies or navigating through them
#[derive(Debug, Error)]
pub enum Error {
    /// Proxy server value is malformed
    ///
    /// Raised when `proxy.server` is not a string or cannot be parsed as
    /// `scheme://host[:port]` or `host:port`.
    #[error("Invalid proxy server: {0}")]
    InvalidProxyServer(String),

    /// A per-context proxy was requested but the browser was launched without one
    ///
    /// Per-context proxies require a process-wide proxy to be enabled at launch.
    /// When every context overrides the proxy, the launch-level value is never
    /// used and can be any placeholder string.
    #[error(
        "Browser needs to be launched with the global proxy. \
        If all contexts override the proxy, global proxy will be never used and can be any string, \
        for example LaunchOptions::new().proxy(ProxySettings::new(\"http://per-context\"))"
    )]
    MissingGlobalProxy,

    /// Only one half of the username/password pair was supplied
    #[error("Invalid proxy credentials: {0}")]
    InvalidCredentials(String),

    /// Proxy kept answering 407 after the single credentialed retry,
    /// or challenged a configuration that carries no credentials
    #[error("Proxy authentication failed for {server}: {reason}")]
    ProxyAuthFailed { server: String, reason: String },

    /// Direct connection to a host matched by the bypass list failed
    ///
    /// This is an ordinary network error; bypassed hosts never fall back to the proxy.
    #[error("Failed to connect to bypassed host '{host}': {source}")]
    BypassedHostUnreachable {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// Could not open a TCP connection to the proxy server itself
    #[error("Failed to connect to proxy {server}: {source}")]
    ProxyUnreachable {
        server: String,
        #[source]
        source: std::io::Error,
    },

    /// Proxy accepted the connection but refused or garbled the tunnel handshake
    #[error("Proxy tunnel through {server} failed: {reason}")]
    TunnelFailed { server: String, reason: String },

    /// Direct connection (no proxy configured) failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Malformed HTTP exchange with the origin server
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Navigation timeout
    ///
    /// Occurs when page navigation exceeds the specified timeout.
    /// The in-flight connection attempt is dropped when this is returned.
    #[error("Navigation timeout after {duration_ms}ms navigating to '{url}'")]
    NavigationTimeout { url: String, duration_ms: u64 },

    /// Target was closed (browser, context, or page)
    #[error("Target closed: Cannot perform operation on closed {target_type}. {context}")]
    TargetClosed {
        target_type: String,
        context: String,
    },

    /// Invalid argument provided to method
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }

    /// True for configuration errors raised synchronously at construction time
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Error::InvalidProxyServer(_)
            | Error::MissingGlobalProxy
            | Error::InvalidCredentials(_) => true,
            Error::Context(_, inner) => inner.is_configuration_error(),
            _ => false,
        }
    }
}
