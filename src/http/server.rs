use super::config::HttpConfig;
use super::protocol::{HttpProtocolError, read_request, write_response};
use crate::common::InspectServerTrait;
use crate::encode::{ResponseEncoder, text_response};
use crate::handler::Api;
use crate::{InspectError, Result};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::{TcpListener, TcpStream};
use tokio::{signal, time::timeout};
use tracing::{error, info, warn, Instrument};

/// HTTP server exposing the request inspection endpoints
///
/// # Examples
///
/// ```no_run
/// use reqinspect::common::InspectServerTrait;
/// use reqinspect::http::{HttpConfig, InspectServer};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = HttpConfig {
///         bind_addr: "127.0.0.1:8080".parse()?,
///         ..Default::default()
///     };
///
///     let server = InspectServer::new(config);
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct InspectServer {
    config: Arc<HttpConfig>,
    api: Arc<Api>,
    shutdown_signal: Arc<tokio::sync::broadcast::Sender<()>>,
}

impl InspectServer {
    /// Creates a server with the default JSON encoder, mounted at `config.path_prefix`
    pub fn new(config: HttpConfig) -> Self {
        let api = Api::new(&config.path_prefix, ResponseEncoder::default());
        Self::with_api(config, api)
    }

    /// Creates a server around a prepared endpoint set
    ///
    /// The prefix of `api` wins over `config.path_prefix`.
    pub fn with_api(config: HttpConfig, api: Api) -> Self {
        let (shutdown_signal, _) = tokio::sync::broadcast::channel(1);
        Self {
            config: Arc::new(config),
            api: Arc::new(api),
            shutdown_signal: Arc::new(shutdown_signal),
        }
    }

    /// Serves connections from an already bound listener until shut down
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!(address = %local_addr, prefix = %self.api.prefix(), "Request inspection server listening");

        let connection_count = Arc::new(AtomicUsize::new(0));
        let mut shutdown_rx = self.shutdown_signal.subscribe();

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => {
                            let current_count = connection_count.load(Ordering::SeqCst);
                            if current_count >= self.config.max_connections {
                                warn!(%addr, current = current_count, limit = self.config.max_connections, "Connection rejected: limit reached");
                                continue;
                            }

                            let new_count = connection_count.fetch_add(1, Ordering::SeqCst) + 1;
                            info!(%addr, current = new_count, "Accepted connection");

                            let config = self.config.clone();
                            let api = self.api.clone();
                            let connection_count = connection_count.clone();
                            let span = tracing::info_span!("connection", %addr);

                            tokio::spawn(async move {
                                let result = Self::handle_connection(stream, addr, api, config).instrument(span).await;
                                if let Err(e) = result {
                                    error!(%addr, error = %e, "Error handling connection");
                                }
                                let final_count = connection_count.fetch_sub(1, Ordering::SeqCst) - 1;
                                info!(%addr, current = final_count, "Connection closed");
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                _ = signal::ctrl_c() => {
                    info!("Received shutdown signal, stopping server");
                    break;
                }
                _ = shutdown_rx.recv() => {
                    info!("Received internal shutdown signal, stopping server");
                    break;
                }
            }
        }

        info!("Request inspection server stopped");
        Ok(())
    }

    /// Serves requests on one connection until it closes or goes idle
    async fn handle_connection(
        mut stream: TcpStream,
        addr: SocketAddr,
        api: Arc<Api>,
        config: Arc<HttpConfig>,
    ) -> Result<()> {
        let local_addr = stream.local_addr()?;
        let server_name = config.server_name.as_deref();
        let mut buffer = BytesMut::with_capacity(config.buffer_size);

        loop {
            let read_result = timeout(
                config.read_timeout,
                read_request(&mut stream, &mut buffer, addr, local_addr, &config),
            )
            .await;

            let request = match read_result {
                Ok(Ok(Some(request))) => request,
                Ok(Ok(None)) => {
                    info!(%addr, "Client closed connection");
                    break;
                }
                Ok(Err(e)) => {
                    Self::reject(&mut stream, &e, server_name).await;
                    return Err(e.into());
                }
                Err(_) => {
                    warn!(%addr, "Read timeout");
                    break;
                }
            };

            let keep_alive = request.keep_alive();
            let response = api.dispatch(&request);

            let write_result = timeout(
                config.write_timeout,
                write_response(&mut stream, &response, keep_alive, server_name),
            )
            .await;
            match write_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => {
                    return Err(InspectError::Timeout(format!("Write to {addr} timed out")));
                }
            }

            if !keep_alive {
                break;
            }
        }

        Ok(())
    }

    /// Tells the peer why its request was refused, when it can still be told
    async fn reject(stream: &mut TcpStream, err: &HttpProtocolError, server_name: Option<&str>) {
        let Some(status) = err.status() else {
            return;
        };
        let response = text_response(status, status.canonical_reason().unwrap_or("Bad Request"));
        if let Err(e) = write_response(stream, &response, false, server_name).await {
            warn!(error = %e, "Failed to send error response");
        }
    }
}

impl InspectServerTrait for InspectServer {
    /// Binds `config.bind_addr` and serves connections
    async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Returns a shutdown signal sender that can be used to gracefully shutdown the server
    fn shutdown_signal(&self) -> tokio::sync::broadcast::Sender<()> {
        self.shutdown_signal.as_ref().clone()
    }
}
