//! Network proxy settings
//!
//! This module defines the [`ProxySettings`] struct which carries the raw,
//! user-supplied proxy configuration for network requests.
//!
//! Proxy settings can be applied at both the browser launch level
//! ([`LaunchOptions`](crate::api::LaunchOptions)) and the browser context level
//! ([`BrowserContextOptions`](crate::protocol::BrowserContextOptions)).
//! They are validated into a [`ProxyConfig`](crate::routing::ProxyConfig)
//! when the browser or context is created.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Network proxy settings for browser contexts and browser launches.
///
/// HTTP and SOCKS5 proxies are supported. Example server values:
/// - `myproxy.com:3128` (HTTP proxy)
/// - `http://myproxy.com:3128`
/// - `socks5://myproxy.com:1080`
///
/// # Example
///
/// ```ignore
/// use browser_proxy::protocol::ProxySettings;
///
/// let proxy = ProxySettings::new("http://proxy.example.com:8080")
///     .bypass(".example.com, chromium.org")
///     .username("user")
///     .password("secret");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxySettings {
    /// Proxy server (e.g., "http://proxy:8080", "proxy:8080" or "socks5://proxy:1080")
    pub server: String,

    /// Comma-separated domains to bypass proxy (e.g., ".example.com, chromium.org")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass: Option<String>,

    /// Proxy username for HTTP proxy authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Proxy password for HTTP proxy authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProxySettings {
    /// Creates proxy settings for the given server with no bypass list or credentials
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Default::default()
        }
    }

    /// Sets the comma-separated bypass list
    pub fn bypass(mut self, bypass: impl Into<String>) -> Self {
        self.bypass = Some(bypass.into());
        self
    }

    /// Sets the proxy username
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the proxy password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Builds settings from an untyped JSON option bag.
    ///
    /// Field types are checked the way the protocol validator checks them, so
    /// `{"server": 123}` fails with `proxy.server: expected string, got number`.
    /// `null` optional fields are treated as absent.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "proxy: expected object, got {}",
                json_type_name(value)
            ))
        })?;

        let server = match obj.get("server") {
            Some(Value::String(server)) => server.clone(),
            Some(other) => {
                return Err(Error::InvalidProxyServer(format!(
                    "proxy.server: expected string, got {}",
                    json_type_name(other)
                )));
            }
            None => {
                return Err(Error::InvalidProxyServer(
                    "proxy.server: expected string, got undefined".to_string(),
                ));
            }
        };

        Ok(Self {
            server,
            bypass: optional_string(obj, "bypass")?,
            username: optional_string(obj, "username")?,
            password: optional_string(obj, "password")?,
        })
    }
}

fn optional_string(obj: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::InvalidArgument(format!(
            "proxy.{}: expected string, got {}",
            field,
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
