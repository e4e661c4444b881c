// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// ProxyRouter - Per-connection routing decision
//
// Given a target URL and the active ProxyConfig, decides whether the
// connection goes direct, through an HTTP CONNECT tunnel, or through a
// SOCKS5 tunnel. Plans are recomputed for every outbound connection.

use crate::error::{Error, Result};
use crate::routing::config::{ProxyConfig, ProxyScheme, ProxyServer};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Routing decision for one outbound connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionPlan {
    /// Connect straight to the target
    Direct,
    /// Open a tunnel with `CONNECT host:port` through an HTTP proxy
    HttpProxyConnect { server: ProxyServer },
    /// Open a tunnel through a SOCKS5 proxy
    Socks5Tunnel { server: ProxyServer },
}

impl ConnectionPlan {
    pub fn is_direct(&self) -> bool {
        matches!(self, ConnectionPlan::Direct)
    }

    /// Proxy server the plan routes through, if any
    pub fn server(&self) -> Option<&ProxyServer> {
        match self {
            ConnectionPlan::Direct => None,
            ConnectionPlan::HttpProxyConnect { server } | ConnectionPlan::Socks5Tunnel { server } => {
                Some(server)
            }
        }
    }
}

impl fmt::Display for ConnectionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionPlan::Direct => write!(f, "direct"),
            ConnectionPlan::HttpProxyConnect { server } => write!(f, "http-connect via {}", server),
            ConnectionPlan::Socks5Tunnel { server } => write!(f, "socks5 via {}", server),
        }
    }
}

/// Plans a connection to `host`.
///
/// No config means direct. A host matched by the bypass list is reached
/// directly; everything else goes through the configured proxy.
pub fn plan_for_host(host: &str, config: Option<&ProxyConfig>) -> ConnectionPlan {
    let Some(config) = config else {
        return ConnectionPlan::Direct;
    };

    if config.bypass().matches(host) {
        return ConnectionPlan::Direct;
    }

    let server = config.server().clone();
    match config.scheme() {
        ProxyScheme::Http => ConnectionPlan::HttpProxyConnect { server },
        ProxyScheme::Socks5 => ConnectionPlan::Socks5Tunnel { server },
    }
}

/// Plans a connection to the host of `target`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the URL has no host (e.g. `data:` URLs).
pub fn plan_for(target: &Url, config: Option<&ProxyConfig>) -> Result<ConnectionPlan> {
    let host = target
        .host_str()
        .ok_or_else(|| Error::InvalidArgument(format!("URL has no host: {}", target)))?;
    Ok(plan_for_host(host, config))
}

/// Routing entry point bound to one scope's proxy configuration.
///
/// Cloning is cheap; every clone shares the same immutable config, so pages of
/// one context route identically without coordination.
#[derive(Debug, Clone, Default)]
pub struct ProxyRouter {
    config: Option<Arc<ProxyConfig>>,
}

impl ProxyRouter {
    pub fn new(config: Option<Arc<ProxyConfig>>) -> Self {
        Self { config }
    }

    /// Router that always connects directly
    pub fn direct() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&Arc<ProxyConfig>> {
        self.config.as_ref()
    }

    /// Plans the connection for `target`
    pub fn plan_for(&self, target: &Url) -> Result<ConnectionPlan> {
        let plan = plan_for(target, self.config.as_deref())?;
        tracing::debug!(target = %target, plan = %plan, "Planned outbound connection");
        Ok(plan)
    }
}
