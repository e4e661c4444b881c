// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// Connector - Opens the TCP stream a ConnectionPlan describes
//
// Direct plans connect to the target. HttpProxyConnect plans open a CONNECT
// tunnel, answering a 407 challenge at most once. Socks5Tunnel plans run the
// SOCKS5 handshake. Proxy failures are never downgraded to a direct
// connection; only a bypass decision leads to a direct connection.

use crate::error::{Error, Result};
use crate::routing::{
    AuthAction, ConnectionPlan, ProxyAuthenticator, ProxyConfig, ProxyRouter, ProxyServer,
};
use crate::server::{http_connect, socks5};
use tokio::net::TcpStream;
use url::Url;

/// Established stream plus the plan that produced it
#[derive(Debug)]
pub struct Connection {
    pub stream: TcpStream,
    pub plan: ConnectionPlan,
}

/// Target host (IPv6 brackets removed) and port for `url`
pub fn target_endpoint(url: &Url) -> Result<(String, u16)> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::InvalidArgument(format!("URL has no host: {}", url)))?;
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
        .to_string();
    let port = url.port_or_known_default().ok_or_else(|| {
        Error::InvalidArgument(format!("URL has no port and no default for its scheme: {}", url))
    })?;
    Ok((host, port))
}

/// Plans and opens a connection to `target`.
///
/// The plan is computed fresh for every call.
pub async fn connect(router: &ProxyRouter, target: &Url) -> Result<Connection> {
    let plan = router.plan_for(target)?;
    let (host, port) = target_endpoint(target)?;
    let config = router.config().map(|c| c.as_ref());

    let stream = match (&plan, config) {
        (ConnectionPlan::Direct, _) => connect_direct(&host, port, config.is_some()).await?,
        (ConnectionPlan::HttpProxyConnect { server }, Some(config)) => {
            connect_http_tunnel(server, config, &host, port).await?
        }
        (ConnectionPlan::Socks5Tunnel { server }, Some(config)) => {
            connect_socks5(server, config, &host, port).await?
        }
        (_, None) => {
            return Err(Error::InvalidArgument(
                "proxied connection plan without a proxy configuration".to_string(),
            ));
        }
    };

    Ok(Connection { stream, plan })
}

async fn connect_direct(host: &str, port: u16, bypassed: bool) -> Result<TcpStream> {
    match TcpStream::connect((host, port)).await {
        Ok(stream) => Ok(stream),
        Err(source) if bypassed => Err(Error::BypassedHostUnreachable {
            host: host.to_string(),
            source,
        }),
        Err(e) => Err(Error::ConnectionFailed(format!("{}:{}: {}", host, port, e))),
    }
}

async fn connect_to_proxy(server: &ProxyServer, label: &str) -> Result<TcpStream> {
    let stream = TcpStream::connect(server.authority())
        .await
        .map_err(|source| Error::ProxyUnreachable {
            server: label.to_string(),
            source,
        })?;
    stream.set_nodelay(true)?;
    Ok(stream)
}

async fn connect_http_tunnel(
    server: &ProxyServer,
    config: &ProxyConfig,
    host: &str,
    port: u16,
) -> Result<TcpStream> {
    let label = config.sanitized_server();
    let authority = if host.contains(':') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    };
    let mut auth = ProxyAuthenticator::new(config.credentials());

    // Bounded by the authenticator: at most one retry after a challenge
    loop {
        let mut stream = connect_to_proxy(server, &label).await?;
        let authorization = auth.authorization();
        let response =
            http_connect::send_connect(&mut stream, &authority, authorization.as_deref())
                .await
                .map_err(|e| match e {
                    Error::ProtocolError(reason) => Error::TunnelFailed {
                        server: label.clone(),
                        reason,
                    },
                    other => other,
                })?;

        match auth.on_status(response.status) {
            AuthAction::Proceed if response.is_established() => {
                tracing::debug!(proxy = %label, target = %authority, "CONNECT tunnel established");
                return Ok(stream);
            }
            AuthAction::Proceed => {
                return Err(Error::TunnelFailed {
                    server: label,
                    reason: format!(
                        "CONNECT {} answered {} {}",
                        authority, response.status, response.reason
                    ),
                });
            }
            AuthAction::Retry => {
                tracing::debug!(proxy = %label, "Proxy requested authentication, retrying with credentials");
                auth.begin_retry();
            }
            AuthAction::Fail(reason) => {
                tracing::warn!(proxy = %label, %reason, "Proxy authentication failed");
                return Err(Error::ProxyAuthFailed {
                    server: label,
                    reason,
                });
            }
        }
    }
}

async fn connect_socks5(
    server: &ProxyServer,
    config: &ProxyConfig,
    host: &str,
    port: u16,
) -> Result<TcpStream> {
    let label = config.sanitized_server();
    let mut stream = connect_to_proxy(server, &label).await?;
    socks5::handshake(&mut stream, &label, host, port, config.credentials()).await?;
    tracing::debug!(proxy = %label, host, port, "SOCKS5 tunnel established");
    Ok(stream)
}
