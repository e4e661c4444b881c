//! HTTP CONNECT tunnel handshake
//!
//! Sends `CONNECT host:port` to an HTTP proxy and reads the proxy's response
//! head. The caller decides what to do with the status (tunnel established,
//! authentication challenge, refusal).

use crate::error::{Error, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on the size of a proxy response head
pub const MAX_RESPONSE_HEAD: usize = 16 * 1024;

/// Status line and headers returned by the proxy for a CONNECT request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
}

impl ConnectResponse {
    /// True for any 2xx answer; the tunnel is open
    pub fn is_established(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Builds the CONNECT request for `authority` (`host:port`)
pub fn build_connect_request(authority: &str, authorization: Option<&str>) -> String {
    let mut request = format!(
        "CONNECT {authority} HTTP/1.1\r\n\
         Host: {authority}\r\n"
    );
    if let Some(authorization) = authorization {
        request.push_str("Proxy-Authorization: ");
        request.push_str(authorization);
        request.push_str("\r\n");
    }
    request.push_str("\r\n");
    request
}

/// Sends a CONNECT request and reads the proxy's response head.
///
/// Bytes are read one at a time so nothing past the head is consumed; once
/// the tunnel is established the stream belongs to the target.
pub async fn send_connect<S>(
    stream: &mut S,
    authority: &str,
    authorization: Option<&str>,
) -> Result<ConnectResponse>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = build_connect_request(authority, authorization);
    tracing::debug!(
        authority,
        with_credentials = authorization.is_some(),
        "Sending CONNECT"
    );

    stream.write_all(request.as_bytes()).await?;
    stream.flush().await?;

    let head = read_response_head(stream).await?;
    parse_response_head(&head)
}

async fn read_response_head<S>(stream: &mut S) -> Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut head = Vec::with_capacity(256);
    let mut byte = [0u8; 1];

    loop {
        let n = stream.read(&mut byte).await?;
        if n == 0 {
            return Err(Error::ProtocolError(
                "proxy closed the connection before completing the CONNECT response".to_string(),
            ));
        }
        head.push(byte[0]);

        if head.ends_with(b"\r\n\r\n") {
            return Ok(head);
        }
        if head.len() > MAX_RESPONSE_HEAD {
            return Err(Error::ProtocolError(format!(
                "CONNECT response head exceeds {} bytes",
                MAX_RESPONSE_HEAD
            )));
        }
    }
}

/// Parses `HTTP/1.x <status> <reason>` followed by header lines
pub fn parse_response_head(head: &[u8]) -> Result<ConnectResponse> {
    let text = std::str::from_utf8(head)
        .map_err(|_| Error::ProtocolError("CONNECT response is not valid UTF-8".to_string()))?;
    let mut lines = text.split("\r\n");

    let status_line = lines.next().unwrap_or_default();
    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/1.") {
        return Err(Error::ProtocolError(format!(
            "unexpected CONNECT status line: {:?}",
            status_line
        )));
    }
    let status = parts
        .next()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| {
            Error::ProtocolError(format!("invalid CONNECT status line: {:?}", status_line))
        })?;
    let reason = parts.next().unwrap_or_default().to_string();

    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect();

    Ok(ConnectResponse {
        status,
        reason,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[test]
    fn test_build_connect_request() {
        let request = build_connect_request("example.com:443", None);
        assert_eq!(
            request,
            "CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\n\r\n"
        );

        let request = build_connect_request("example.com:80", Some("Basic dXNlcjpzZWNyZXQ="));
        assert!(request.contains("Proxy-Authorization: Basic dXNlcjpzZWNyZXQ=\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_parse_response_head() {
        let head = b"HTTP/1.1 407 Proxy Authentication Required\r\n\
                     Proxy-Authenticate: Basic realm=\"proxy\"\r\n\r\n";
        let response = parse_response_head(head).unwrap();
        assert_eq!(response.status, 407);
        assert_eq!(response.reason, "Proxy Authentication Required");
        assert_eq!(
            response.header("proxy-authenticate"),
            Some("Basic realm=\"proxy\"")
        );
        assert!(!response.is_established());

        let ok = parse_response_head(b"HTTP/1.0 200 Connection established\r\n\r\n").unwrap();
        assert!(ok.is_established());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_response_head(b"SSH-2.0-OpenSSH\r\n\r\n").is_err());
        assert!(parse_response_head(b"HTTP/1.1 abc nope\r\n\r\n").is_err());
    }

    #[tokio::test]
    async fn test_send_connect_leaves_tunnel_bytes_unread() {
        let (mut client, mut proxy) = duplex(1024);

        let proxy_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 512];
            let n = proxy.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            proxy
                .write_all(b"HTTP/1.1 200 Connection established\r\n\r\ntunnel-bytes")
                .await
                .unwrap();
            request
        });

        let response = send_connect(&mut client, "target.test:80", None).await.unwrap();
        assert_eq!(response.status, 200);

        let mut rest = [0u8; 12];
        client.read_exact(&mut rest).await.unwrap();
        assert_eq!(&rest, b"tunnel-bytes");

        let request = proxy_task.await.unwrap();
        assert!(request.starts_with("CONNECT target.test:80 HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_send_connect_detects_early_close() {
        let (mut client, proxy) = duplex(1024);
        drop(proxy);
        let err = send_connect(&mut client, "target.test:80", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_) | Error::ProtocolError(_)));
    }
}
