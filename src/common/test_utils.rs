use crate::common::InspectServerTrait;
use crate::encode::{DetailsSerializer, EncodeError};
use crate::handler::Api;
use crate::http::{HttpConfig, InspectServer};
use crate::inspect::RequestDetails;
use crate::{InspectError, Result};
use bytes::BytesMut;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Serializer that always fails, for exercising the error paths
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingSerializer;

impl DetailsSerializer for FailingSerializer {
    fn serialize(&self, _details: &RequestDetails) -> std::result::Result<String, EncodeError> {
        Err(EncodeError::Json(<serde_json::Error as serde::ser::Error>::custom(
            "Erro de JSON",
        )))
    }
}

/// Starts a server for `api` on an ephemeral loopback port
///
/// Returns the serving task, the bound address and the server's shutdown sender.
pub async fn spawn_test_server(
    api: Api,
) -> Result<(JoinHandle<Result<()>>, SocketAddr, broadcast::Sender<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let config = HttpConfig {
        bind_addr: addr,
        max_connections: 16,
        read_timeout: Duration::from_secs(5),
        write_timeout: Duration::from_secs(5),
        ..Default::default()
    };

    let server = InspectServer::with_api(config, api);
    let shutdown = server.shutdown_signal();
    let server_handle = tokio::spawn(async move { server.serve(listener).await });

    Ok((server_handle, addr, shutdown))
}

/// A response as read off the wire
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    /// Case-insensitive lookup of the first value of a header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn parse_head(buf: &[u8]) -> Result<Option<(Self, usize)>> {
        let mut headers = [httparse::EMPTY_HEADER; 32];
        let mut res = httparse::Response::new(&mut headers);

        match res.parse(buf) {
            Ok(httparse::Status::Complete(head_len)) => {
                let headers = res
                    .headers
                    .iter()
                    .map(|h| (h.name.to_string(), String::from_utf8_lossy(h.value).into_owned()))
                    .collect();
                let response = Self {
                    status: res.code.unwrap_or_default(),
                    headers,
                    body: String::new(),
                };
                Ok(Some((response, head_len)))
            }
            Ok(httparse::Status::Partial) => Ok(None),
            Err(e) => Err(InspectError::Config(format!("Malformed response: {e}"))),
        }
    }
}

/// Reads one `Content-Length` framed response from the stream
pub async fn read_response<S>(stream: &mut S) -> Result<RawResponse>
where
    S: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(1024);

    loop {
        if let Some((mut response, head_len)) = RawResponse::parse_head(&buf[..])? {
            let body_len = response
                .header("content-length")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);

            while buf.len() < head_len + body_len {
                if stream.read_buf(&mut buf).await? == 0 {
                    return Err(unexpected_eof());
                }
            }

            response.body = String::from_utf8(buf[head_len..head_len + body_len].to_vec())?;
            return Ok(response);
        }

        if stream.read_buf(&mut buf).await? == 0 {
            return Err(unexpected_eof());
        }
    }
}

/// Sends a raw request on a fresh connection and reads the response
pub async fn fetch(addr: SocketAddr, request: &str) -> Result<RawResponse> {
    let mut stream = TcpStream::connect(addr).await?;
    stream.write_all(request.as_bytes()).await?;
    stream.flush().await?;
    read_response(&mut stream).await
}

fn unexpected_eof() -> InspectError {
    InspectError::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "Connection closed before the full response arrived",
    ))
}
