use super::protocol::HttpProtocolError;
use crate::inspect::RequestView;
use http::header::{CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use http::{Method, Uri, Version};
use std::net::SocketAddr;

/// A parsed HTTP request head
///
/// Headers are kept as received: original name casing, receipt order and
/// repeated names all survive.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    remote_addr: SocketAddr,
    local_addr: SocketAddr,
    method: Method,
    uri: Uri,
    version: Version,
    headers: Vec<(String, String)>,
}

impl InboundRequest {
    /// Creates an HTTP/1.1 request without headers
    pub fn new(remote_addr: SocketAddr, local_addr: SocketAddr, method: Method, uri: Uri) -> Self {
        Self {
            remote_addr,
            local_addr,
            method,
            uri,
            version: Version::HTTP_11,
            headers: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn http_method(&self) -> &Method {
        &self.method
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Request path without query string
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Declared body length, if any
    ///
    /// A value that is not a plain decimal number, or repeated headers that
    /// disagree, make the request framing ambiguous and are rejected.
    pub fn content_length(&self) -> Result<Option<usize>, HttpProtocolError> {
        let mut declared = None;

        for (_, value) in self
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(CONTENT_LENGTH.as_str()))
        {
            let value = value.trim();
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                return Err(HttpProtocolError::InvalidRequest(format!(
                    "Invalid Content-Length {value:?}"
                )));
            }
            let len: usize = value.parse().map_err(|_| {
                HttpProtocolError::InvalidRequest(format!("Content-Length {value} out of range"))
            })?;

            match declared {
                Some(previous) if previous != len => {
                    return Err(HttpProtocolError::InvalidRequest(format!(
                        "Conflicting Content-Length values {previous} and {len}"
                    )));
                }
                _ => declared = Some(len),
            }
        }

        Ok(declared)
    }

    /// Whether the request carries a `Transfer-Encoding` header
    pub fn is_chunked(&self) -> bool {
        self.header(TRANSFER_ENCODING.as_str()).is_some()
    }

    /// Whether the connection should stay open after the response
    ///
    /// HTTP/1.1 keeps the connection unless `Connection: close` is sent;
    /// HTTP/1.0 closes it unless `Connection: keep-alive` is sent.
    pub fn keep_alive(&self) -> bool {
        let connection = self.header(CONNECTION.as_str());
        let has_token = |token: &str| {
            connection
                .map(|v| v.split(',').any(|t| t.trim().eq_ignore_ascii_case(token)))
                .unwrap_or(false)
        };

        match self.version {
            Version::HTTP_10 => has_token("keep-alive"),
            _ => !has_token("close"),
        }
    }
}

impl RequestView for InboundRequest {
    fn remote_address(&self) -> String {
        self.remote_addr.ip().to_string()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn method(&self) -> &str {
        self.method.as_str()
    }

    fn request_url(&self) -> String {
        if let Some(authority) = self.uri.authority() {
            let scheme = self.uri.scheme_str().unwrap_or("http");
            return format!("{scheme}://{authority}{}", self.uri.path());
        }

        match self.header(HOST.as_str()).map(str::trim).filter(|h| !h.is_empty()) {
            Some(host) => format!("http://{host}{}", self.uri.path()),
            None => format!("http://{}{}", self.local_addr, self.uri.path()),
        }
    }

    fn header_names(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(|(name, _)| name.as_str())
    }
}
