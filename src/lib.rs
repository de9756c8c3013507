use crate::http::protocol::HttpProtocolError;
use thiserror::Error;

/// Error types for the reqinspect library
#[derive(Error, Debug)]
pub enum InspectError {
    /// Socket-level errors (bind, accept, read, write)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP framing and parsing errors
    #[error("HTTP protocol error: {0}")]
    Protocol(#[from] HttpProtocolError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// UTF-8 encoding errors
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type for the reqinspect library
pub type Result<T> = std::result::Result<T, InspectError>;

pub mod common;
pub mod encode;
pub mod handler;
pub mod http;
pub mod inspect;

// Re-export main types for convenience
pub use common::InspectServerTrait;
pub use encode::{DetailsSerializer, EncodeError, JsonSerializer, ResponseEncoder};
pub use handler::{Api, HandlerError, normalize};
pub use crate::http::{HttpConfig, InboundRequest, InspectServer};
pub use inspect::{BasicDetails, ExtendedDetails, RequestDetails, RequestView};
