// Launch options for Browser::launch_with_options()
//
// The launch-level proxy is the process-wide proxy: contexts inherit it, and
// per-context proxies are only permitted when it is present.

use crate::protocol::ProxySettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options for launching a browser
///
/// All options are optional and fall back to defaults if not specified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    /// Network proxy settings applied to every context that does not override them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxySettings>,

    /// Default navigation timeout in milliseconds (default: DEFAULT_TIMEOUT_MS, 0 disables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

impl LaunchOptions {
    /// Creates a new LaunchOptions with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set network proxy settings
    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set the default navigation timeout in milliseconds. Pass 0 to disable timeout.
    pub fn timeout(mut self, ms: f64) -> Self {
        self.timeout = Some(ms);
        self
    }

    /// Effective default navigation timeout
    pub(crate) fn default_timeout(&self) -> Duration {
        millis_to_duration(self.timeout.unwrap_or(crate::DEFAULT_TIMEOUT_MS))
    }
}

/// Converts a millisecond option value to a Duration.
///
/// Zero, negatives and NaN become `Duration::ZERO`, which navigation treats as
/// "no timeout".
pub(crate) fn millis_to_duration(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
