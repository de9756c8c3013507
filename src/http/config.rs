use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Configuration for the request inspection server
///
/// # Examples
///
/// ```rust
/// use reqinspect::http::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig {
///     bind_addr: "127.0.0.1:8080".parse().unwrap(),
///     max_connections: 100,
///     read_timeout: Duration::from_secs(10),
///     path_prefix: "/diag".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.max_headers, 64);
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Network address to bind to
    pub bind_addr: SocketAddr,
    /// Maximum number of concurrent connections
    pub max_connections: usize,
    /// Read chunk size for incoming requests
    pub buffer_size: usize,
    /// Upper bound for a request head, and separately for a discarded body
    pub max_request_size: usize,
    /// Maximum number of headers accepted per request
    pub max_headers: usize,
    /// Read timeout for connections, also bounds keep-alive idle time
    pub read_timeout: Duration,
    /// Write timeout for connections
    pub write_timeout: Duration,
    /// Server name to include in responses (optional)
    pub server_name: Option<String>,
    /// Path prefix the endpoints are mounted under
    pub path_prefix: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            max_connections: 100,
            buffer_size: 8192,
            max_request_size: 64 * 1024,
            max_headers: 64,
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
            server_name: Some(format!("reqinspect/{}", env!("CARGO_PKG_VERSION"))),
            path_prefix: "/api".to_string(),
        }
    }
}
