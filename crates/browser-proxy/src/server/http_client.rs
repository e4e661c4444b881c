//! Minimal HTTP/1.1 GET over an established stream
//!
//! Used by `Page::goto` once the connector has produced a direct or tunnelled
//! stream. Requests are sent in origin-form, so the same code serves direct
//! connections and CONNECT/SOCKS5 tunnels.

use crate::error::{Error, Result};
use bytes::Bytes;
use http::{Method, Request, header};
use http_body_util::{BodyExt, Empty, LengthLimitError, Limited};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use url::{Position, Url};

/// User-Agent sent with navigation requests
pub const USER_AGENT: &str = concat!("browser-proxy/", env!("CARGO_PKG_VERSION"));

/// Upper bound on the size of a navigation response body
pub const MAX_RESPONSE_BODY: usize = 32 * 1024 * 1024;

/// Issues `GET target` on `stream` and collects the full response body.
///
/// The connection is driven in the same future as the request, so dropping the
/// returned future (timeout, cancellation) closes the socket. Bodies larger
/// than [`MAX_RESPONSE_BODY`] fail with `ProtocolError`.
pub async fn get<S>(stream: S, target: &Url) -> Result<http::Response<Bytes>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    get_with_limit(stream, target, MAX_RESPONSE_BODY).await
}

async fn get_with_limit<S>(stream: S, target: &Url, body_limit: usize) -> Result<http::Response<Bytes>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let host = target
        .host_str()
        .ok_or_else(|| Error::InvalidArgument(format!("URL has no host: {}", target)))?;
    let host_header = match target.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let path = &target[Position::BeforePath..Position::AfterQuery];
    let path = if path.is_empty() { "/" } else { path };

    let request = Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(header::HOST, host_header)
        .header(header::USER_AGENT, USER_AGENT)
        .header(header::ACCEPT, "*/*")
        .body(Empty::<Bytes>::new())
        .map_err(|e| Error::InvalidArgument(format!("Invalid request for {}: {}", target, e)))?;

    let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| Error::ProtocolError(format!("HTTP handshake failed: {}", e)))?;

    let exchange = async move {
        let response = sender.send_request(request).await.map_err(|e| {
            Error::ProtocolError(format!("HTTP request to {} failed: {}", target, e))
        })?;
        let (parts, body) = response.into_parts();
        let body = Limited::new(body, body_limit)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    Error::ProtocolError(format!(
                        "Response body from {} exceeds {} bytes",
                        target, body_limit
                    ))
                } else {
                    Error::ProtocolError(format!("Failed to read response from {}: {}", target, e))
                }
            })?
            .to_bytes();
        Ok::<_, Error>(http::Response::from_parts(parts, body))
    };

    // `sender` is dropped when the exchange finishes, which lets the connection close
    let (response, connection) = tokio::join!(exchange, connection);
    if let Err(e) = connection {
        tracing::debug!("HTTP connection closed with error: {}", e);
    }

    response
}
