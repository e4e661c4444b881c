// Response - Result of a page navigation
//
// Carries the HTTP status, headers and body of the navigated document, plus
// the connection plan that was used to reach it.

use crate::error::{Error, Result};
use crate::routing::ConnectionPlan;
use bytes::Bytes;
use std::collections::HashMap;

/// Response represents the HTTP response to a navigation.
///
/// Response objects are not created directly - they are returned from
/// [`Page::goto`](crate::protocol::Page::goto).
#[derive(Debug, Clone)]
pub struct Response {
    url: String,
    status: u16,
    status_text: String,
    headers: http::HeaderMap,
    body: Bytes,
    plan: ConnectionPlan,
}

impl Response {
    pub(crate) fn new(url: String, plan: ConnectionPlan, response: http::Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        let status_text = parts
            .status
            .canonical_reason()
            .unwrap_or_default()
            .to_string();
        Self {
            url,
            status: parts.status.as_u16(),
            status_text,
            headers: parts.headers,
            body,
            plan,
        }
    }

    /// Returns the URL of the response
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the HTTP status text (e.g. "OK")
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// True if the status is in the 200-299 range
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of the named header (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All headers with lowercased names; repeated headers are joined with ", "
    pub fn headers(&self) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = HashMap::new();
        for (name, value) in &self.headers {
            let Ok(value) = value.to_str() else {
                continue;
            };
            map.entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }
        map
    }

    /// Raw response body
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Response body decoded as UTF-8
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| Error::ProtocolError(format!("Response body is not UTF-8: {}", e)))
    }

    /// How the connection for this navigation was routed
    pub fn connection_plan(&self) -> &ConnectionPlan {
        &self.plan
    }
}
