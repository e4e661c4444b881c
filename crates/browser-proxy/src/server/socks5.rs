//! SOCKS5 client handshake (RFC 1928, RFC 1929)
//!
//! Negotiates an authentication method, optionally performs the
//! username/password sub-negotiation, and issues a CONNECT command for the
//! target. Domain names are sent as-is so the proxy resolves them.

use crate::error::{Error, Result};
use crate::routing::Credentials;
use std::net::IpAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const SOCKS5_VERSION: u8 = 0x05;
pub const AUTH_NO_AUTH: u8 = 0x00;
pub const AUTH_USERNAME_PASSWORD: u8 = 0x02;
pub const AUTH_NO_ACCEPTABLE: u8 = 0xFF;
pub const AUTH_SUBNEG_VERSION: u8 = 0x01;
pub const CMD_CONNECT: u8 = 0x01;
pub const ATYP_IPV4: u8 = 0x01;
pub const ATYP_DOMAIN: u8 = 0x03;
pub const ATYP_IPV6: u8 = 0x04;
pub const REP_SUCCESS: u8 = 0x00;

/// Human-readable text for a SOCKS5 reply code
pub fn reply_message(code: u8) -> &'static str {
    match code {
        0x00 => "succeeded",
        0x01 => "general SOCKS server failure",
        0x02 => "connection not allowed by ruleset",
        0x03 => "network unreachable",
        0x04 => "host unreachable",
        0x05 => "connection refused",
        0x06 => "TTL expired",
        0x07 => "command not supported",
        0x08 => "address type not supported",
        _ => "unknown reply code",
    }
}

/// Encodes the CONNECT request for `host:port`
pub fn build_connect_request(host: &str, port: u16) -> Result<Vec<u8>> {
    let mut request = vec![SOCKS5_VERSION, CMD_CONNECT, 0x00];

    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    match bare.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            request.push(ATYP_IPV4);
            request.extend_from_slice(&ip.octets());
        }
        Ok(IpAddr::V6(ip)) => {
            request.push(ATYP_IPV6);
            request.extend_from_slice(&ip.octets());
        }
        Err(_) => {
            let len = u8::try_from(bare.len()).map_err(|_| {
                Error::InvalidArgument(format!(
                    "host name too long for SOCKS5 ({} bytes): {}",
                    bare.len(),
                    bare
                ))
            })?;
            request.push(ATYP_DOMAIN);
            request.push(len);
            request.extend_from_slice(bare.as_bytes());
        }
    }

    request.extend_from_slice(&port.to_be_bytes());
    Ok(request)
}

/// Runs the full client handshake on `stream`.
///
/// `server` is only used to label errors. Credentials, when present, are
/// offered alongside the no-auth method and used if the proxy selects
/// username/password.
pub async fn handshake<S>(
    stream: &mut S,
    server: &str,
    host: &str,
    port: u16,
    credentials: Option<&Credentials>,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let tunnel_failed = |reason: String| Error::TunnelFailed {
        server: server.to_string(),
        reason,
    };

    // Method selection: VER | NMETHODS | METHODS
    let greeting: &[u8] = if credentials.is_some() {
        &[SOCKS5_VERSION, 2, AUTH_NO_AUTH, AUTH_USERNAME_PASSWORD]
    } else {
        &[SOCKS5_VERSION, 1, AUTH_NO_AUTH]
    };
    stream.write_all(greeting).await?;

    let mut choice = [0u8; 2];
    stream.read_exact(&mut choice).await?;
    if choice[0] != SOCKS5_VERSION {
        return Err(tunnel_failed(format!(
            "unexpected SOCKS version {:#04x} in method selection",
            choice[0]
        )));
    }

    match choice[1] {
        AUTH_NO_AUTH => {}
        AUTH_USERNAME_PASSWORD => {
            let Some(credentials) = credentials else {
                return Err(Error::ProxyAuthFailed {
                    server: server.to_string(),
                    reason: "SOCKS5 proxy requires username/password authentication".to_string(),
                });
            };
            authenticate(stream, server, credentials).await?;
        }
        AUTH_NO_ACCEPTABLE => {
            return Err(Error::ProxyAuthFailed {
                server: server.to_string(),
                reason: "SOCKS5 proxy accepted none of the offered authentication methods"
                    .to_string(),
            });
        }
        other => {
            return Err(tunnel_failed(format!(
                "SOCKS5 proxy selected unsupported method {:#04x}",
                other
            )));
        }
    }

    let request = build_connect_request(host, port)?;
    stream.write_all(&request).await?;
    tracing::debug!(server, host, port, "Sent SOCKS5 CONNECT");

    // Reply: VER | REP | RSV | ATYP | BND.ADDR | BND.PORT
    let mut reply = [0u8; 4];
    stream.read_exact(&mut reply).await?;
    if reply[0] != SOCKS5_VERSION {
        return Err(tunnel_failed(format!(
            "unexpected SOCKS version {:#04x} in reply",
            reply[0]
        )));
    }
    if reply[1] != REP_SUCCESS {
        return Err(tunnel_failed(format!(
            "SOCKS5 CONNECT to {}:{} rejected: {} ({:#04x})",
            host,
            port,
            reply_message(reply[1]),
            reply[1]
        )));
    }

    let remaining = match reply[3] {
        ATYP_IPV4 => 4 + 2,
        ATYP_IPV6 => 16 + 2,
        ATYP_DOMAIN => {
            let mut len = [0u8; 1];
            stream.read_exact(&mut len).await?;
            len[0] as usize + 2
        }
        other => {
            return Err(tunnel_failed(format!(
                "invalid address type {:#04x} in SOCKS5 reply",
                other
            )));
        }
    };
    let mut bound = vec![0u8; remaining];
    stream.read_exact(&mut bound).await?;

    Ok(())
}

async fn authenticate<S>(stream: &mut S, server: &str, credentials: &Credentials) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let username = credentials.username().as_bytes();
    let password = credentials.password().as_bytes();
    let (Ok(ulen), Ok(plen)) = (u8::try_from(username.len()), u8::try_from(password.len())) else {
        return Err(Error::InvalidCredentials(
            "SOCKS5 username and password must each be at most 255 bytes".to_string(),
        ));
    };

    // VER | ULEN | UNAME | PLEN | PASSWD
    let mut request = Vec::with_capacity(3 + username.len() + password.len());
    request.push(AUTH_SUBNEG_VERSION);
    request.push(ulen);
    request.extend_from_slice(username);
    request.push(plen);
    request.extend_from_slice(password);
    stream.write_all(&request).await?;

    // VER | STATUS
    let mut status = [0u8; 2];
    stream.read_exact(&mut status).await?;
    if status[0] != AUTH_SUBNEG_VERSION {
        return Err(Error::TunnelFailed {
            server: server.to_string(),
            reason: format!(
                "unexpected sub-negotiation version {:#04x} in authentication reply",
                status[0]
            ),
        });
    }
    if status[1] != 0x00 {
        tracing::warn!(server, "SOCKS5 proxy rejected credentials");
        return Err(Error::ProxyAuthFailed {
            server: server.to_string(),
            reason: "SOCKS5 proxy rejected the configured credentials".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[test]
    fn test_build_connect_request_domain() {
        let request = build_connect_request("example.com", 80).unwrap();
        assert_eq!(&request[..5], &[0x05, 0x01, 0x00, ATYP_DOMAIN, 11]);
        assert_eq!(&request[5..16], b"example.com");
        assert_eq!(&request[16..], &80u16.to_be_bytes());
    }

    #[test]
    fn test_build_connect_request_ip_literals() {
        let v4 = build_connect_request("127.0.0.1", 8080).unwrap();
        assert_eq!(v4, vec![0x05, 0x01, 0x00, ATYP_IPV4, 127, 0, 0, 1, 0x1f, 0x90]);

        let v6 = build_connect_request("[::1]", 443).unwrap();
        assert_eq!(v6[3], ATYP_IPV6);
        assert_eq!(v6.len(), 4 + 16 + 2);
    }

    #[test]
    fn test_build_connect_request_rejects_long_host() {
        let host = "a".repeat(256);
        assert!(build_connect_request(&host, 80).is_err());
    }

    #[tokio::test]
    async fn test_handshake_without_auth() {
        let (mut client, mut proxy) = duplex(1024);

        let proxy_task = tokio::spawn(async move {
            let mut greeting = [0u8; 3];
            proxy.read_exact(&mut greeting).await.unwrap();
            assert_eq!(greeting, [SOCKS5_VERSION, 1, AUTH_NO_AUTH]);
            proxy.write_all(&[SOCKS5_VERSION, AUTH_NO_AUTH]).await.unwrap();

            let mut head = [0u8; 5];
            proxy.read_exact(&mut head).await.unwrap();
            assert_eq!(head[3], ATYP_DOMAIN);
            let mut rest = vec![0u8; head[4] as usize + 2];
            proxy.read_exact(&mut rest).await.unwrap();

            proxy
                .write_all(&[SOCKS5_VERSION, REP_SUCCESS, 0x00, ATYP_IPV4, 127, 0, 0, 1, 0, 80])
                .await
                .unwrap();
            String::from_utf8_lossy(&rest[..rest.len() - 2]).to_string()
        });

        handshake(&mut client, "socks5://proxy", "target.test", 80, None)
            .await
            .unwrap();
        assert_eq!(proxy_task.await.unwrap(), "target.test");
    }

    #[tokio::test]
    async fn test_handshake_with_username_password() {
        let (mut client, mut proxy) = duplex(1024);

        let proxy_task = tokio::spawn(async move {
            let mut greeting = [0u8; 4];
            proxy.read_exact(&mut greeting).await.unwrap();
            assert_eq!(greeting[1], 2);
            proxy
                .write_all(&[SOCKS5_VERSION, AUTH_USERNAME_PASSWORD])
                .await
                .unwrap();

            let mut ver_ulen = [0u8; 2];
            proxy.read_exact(&mut ver_ulen).await.unwrap();
            let mut username = vec![0u8; ver_ulen[1] as usize];
            proxy.read_exact(&mut username).await.unwrap();
            let mut plen = [0u8; 1];
            proxy.read_exact(&mut plen).await.unwrap();
            let mut password = vec![0u8; plen[0] as usize];
            proxy.read_exact(&mut password).await.unwrap();

            let accepted = username == b"user" && password == b"secret";
            proxy
                .write_all(&[AUTH_SUBNEG_VERSION, if accepted { 0x00 } else { 0x01 }])
                .await
                .unwrap();
            accepted
        });

        let credentials = Credentials::new("user", "wrong");
        let err = handshake(&mut client, "socks5://proxy", "target.test", 80, Some(&credentials))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProxyAuthFailed { .. }));
        assert!(!proxy_task.await.unwrap());
    }

    #[tokio::test]
    async fn test_authentication_reply_version_is_checked() {
        let (mut client, mut proxy) = duplex(1024);

        tokio::spawn(async move {
            let mut greeting = [0u8; 4];
            proxy.read_exact(&mut greeting).await.unwrap();
            proxy
                .write_all(&[SOCKS5_VERSION, AUTH_USERNAME_PASSWORD])
                .await
                .unwrap();

            // VER(1) ULEN(1) "user"(4) PLEN(1) "secret"(6)
            let mut request = [0u8; 13];
            proxy.read_exact(&mut request).await.unwrap();
            // Status byte says success, but the version is SOCKS5 instead of 0x01
            proxy.write_all(&[SOCKS5_VERSION, 0x00]).await.unwrap();
        });

        let credentials = Credentials::new("user", "secret");
        let err = handshake(&mut client, "socks5://proxy", "target.test", 80, Some(&credentials))
            .await
            .unwrap_err();
        match err {
            Error::TunnelFailed { reason, .. } => assert!(reason.contains("sub-negotiation")),
            other => panic!("Expected TunnelFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_handshake_reports_reply_code() {
        let (mut client, mut proxy) = duplex(1024);

        tokio::spawn(async move {
            let mut greeting = [0u8; 3];
            proxy.read_exact(&mut greeting).await.unwrap();
            proxy.write_all(&[SOCKS5_VERSION, AUTH_NO_AUTH]).await.unwrap();
            let mut request = [0u8; 10];
            proxy.read_exact(&mut request).await.unwrap();
            proxy
                .write_all(&[SOCKS5_VERSION, 0x05, 0x00, ATYP_IPV4, 0, 0, 0, 0, 0, 0])
                .await
                .unwrap();
        });

        let err = handshake(&mut client, "socks5://proxy", "10.0.0.1", 80, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_handshake_requires_credentials_when_demanded() {
        let (mut client, mut proxy) = duplex(1024);

        tokio::spawn(async move {
            let mut greeting = [0u8; 3];
            proxy.read_exact(&mut greeting).await.unwrap();
            proxy
                .write_all(&[SOCKS5_VERSION, AUTH_NO_ACCEPTABLE])
                .await
                .unwrap();
        });

        let err = handshake(&mut client, "socks5://proxy", "target.test", 80, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProxyAuthFailed { .. }));
    }
}
