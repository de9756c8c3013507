use super::config::HttpConfig;
use super::request::InboundRequest;
use bytes::{Buf, BufMut, BytesMut};
use http::{Method, Response, StatusCode, Uri, Version};
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, thiserror::Error)]
pub enum HttpProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("HTTP parsing error: {0}")]
    HttpParse(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Request head exceeds {limit} bytes")]
    RequestTooLarge { limit: usize },
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("Incomplete request")]
    IncompleteRequest,
}

impl HttpProtocolError {
    /// Status to answer with before closing the connection, if the peer can still be told
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpProtocolError::HttpParse(_) | HttpProtocolError::InvalidRequest(_) => {
                Some(StatusCode::BAD_REQUEST)
            }
            HttpProtocolError::RequestTooLarge { .. } => {
                Some(StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE)
            }
            HttpProtocolError::PayloadTooLarge { .. } => Some(StatusCode::PAYLOAD_TOO_LARGE),
            HttpProtocolError::Io(_) | HttpProtocolError::IncompleteRequest => None,
        }
    }
}

/// Parses a request head from the start of `buf`
///
/// Returns `Ok(None)` while the head is still partial, otherwise the request
/// and the number of bytes the head occupied.
pub fn parse_head(
    buf: &[u8],
    remote_addr: SocketAddr,
    local_addr: SocketAddr,
    max_headers: usize,
) -> Result<Option<(InboundRequest, usize)>, HttpProtocolError> {
    let mut headers = vec![httparse::EMPTY_HEADER; max_headers];
    let mut req = httparse::Request::new(&mut headers);

    let head_len = match req.parse(buf) {
        Ok(httparse::Status::Complete(parsed_len)) => parsed_len,
        Ok(httparse::Status::Partial) => return Ok(None),
        Err(e) => {
            return Err(HttpProtocolError::HttpParse(format!(
                "Failed to parse request head: {e}"
            )));
        }
    };

    let method = req
        .method
        .ok_or_else(|| HttpProtocolError::HttpParse("Missing method".to_string()))?;
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|e| HttpProtocolError::InvalidRequest(format!("Invalid method {method}: {e}")))?;

    let target = req
        .path
        .ok_or_else(|| HttpProtocolError::HttpParse("Missing request target".to_string()))?;
    let uri: Uri = target.parse().map_err(|e| {
        HttpProtocolError::InvalidRequest(format!("Invalid request target {target}: {e}"))
    })?;

    let version = match req.version {
        Some(0) => Version::HTTP_10,
        _ => Version::HTTP_11,
    };

    let mut request = InboundRequest::new(remote_addr, local_addr, method, uri).with_version(version);
    for header in req.headers.iter() {
        request = request.with_header(header.name, String::from_utf8_lossy(header.value));
    }

    Ok(Some((request, head_len)))
}

/// Reads the next request from the stream
///
/// Bytes past the request (a pipelined request) stay in `buf` for the next
/// call. A `Content-Length` body is read and dropped. Returns `Ok(None)` when
/// the peer closes the connection between requests.
pub async fn read_request<S>(
    stream: &mut S,
    buf: &mut BytesMut,
    remote_addr: SocketAddr,
    local_addr: SocketAddr,
    config: &HttpConfig,
) -> Result<Option<InboundRequest>, HttpProtocolError>
where
    S: AsyncRead + Unpin,
{
    loop {
        if !buf.is_empty() {
            if let Some((request, head_len)) =
                parse_head(&buf[..], remote_addr, local_addr, config.max_headers)?
            {
                if head_len > config.max_request_size {
                    return Err(HttpProtocolError::RequestTooLarge {
                        limit: config.max_request_size,
                    });
                }
                buf.advance(head_len);

                if request.is_chunked() {
                    return Err(HttpProtocolError::InvalidRequest(
                        "Chunked request bodies are not supported".to_string(),
                    ));
                }
                if let Some(len) = request.content_length()? {
                    discard_body(stream, buf, len, config).await?;
                }
                return Ok(Some(request));
            }

            if buf.len() > config.max_request_size {
                return Err(HttpProtocolError::RequestTooLarge {
                    limit: config.max_request_size,
                });
            }
        }

        buf.reserve(config.buffer_size);
        let n = stream.read_buf(buf).await?;
        if n == 0 {
            return if buf.is_empty() {
                Ok(None)
            } else {
                Err(HttpProtocolError::IncompleteRequest)
            };
        }
    }
}

async fn discard_body<S>(
    stream: &mut S,
    buf: &mut BytesMut,
    len: usize,
    config: &HttpConfig,
) -> Result<(), HttpProtocolError>
where
    S: AsyncRead + Unpin,
{
    if len > config.max_request_size {
        return Err(HttpProtocolError::PayloadTooLarge {
            limit: config.max_request_size,
        });
    }

    let buffered = len.min(buf.len());
    buf.advance(buffered);
    let mut remaining = len - buffered;

    while remaining > 0 {
        buf.reserve(config.buffer_size);
        let n = stream.read_buf(buf).await?;
        if n == 0 {
            return Err(HttpProtocolError::IncompleteRequest);
        }
        let take = n.min(remaining);
        buf.advance(take);
        remaining -= take;
    }

    Ok(())
}

/// Serializes a response into HTTP/1.1 wire format
pub fn encode_response(
    response: &Response<String>,
    keep_alive: bool,
    server_name: Option<&str>,
) -> BytesMut {
    let status = response.status();
    let body = response.body().as_bytes();
    let mut out = BytesMut::with_capacity(256 + body.len());

    out.put_slice(
        format!(
            "HTTP/1.1 {} {}\r\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .as_bytes(),
    );
    put_header(&mut out, "Content-Length", body.len().to_string().as_bytes());
    let connection = if keep_alive { "keep-alive" } else { "close" };
    put_header(&mut out, "Connection", connection.as_bytes());
    if let Some(name) = server_name {
        put_header(&mut out, "Server", name.as_bytes());
    }
    for (name, value) in response.headers() {
        put_header(&mut out, name.as_str(), value.as_bytes());
    }
    out.put_slice(b"\r\n");
    out.put_slice(body);
    out
}

fn put_header(out: &mut BytesMut, name: &str, value: &[u8]) {
    out.put_slice(name.as_bytes());
    out.put_slice(b": ");
    out.put_slice(value);
    out.put_slice(b"\r\n");
}

/// Writes a response and flushes the stream
pub async fn write_response<S>(
    stream: &mut S,
    response: &Response<String>,
    keep_alive: bool,
    server_name: Option<&str>,
) -> Result<(), HttpProtocolError>
where
    S: AsyncWrite + Unpin,
{
    let bytes = encode_response(response, keep_alive, server_name);
    stream.write_all(&bytes).await?;
    stream.flush().await?;
    Ok(())
}
