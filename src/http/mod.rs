//! HTTP/1.x transport for the inspection endpoints
//!
//! This module parses requests off TCP connections with `httparse`, hands
//! them to [`crate::handler::Api`] and writes the responses back, keeping
//! connections alive when the client asks for it.

pub mod config;
pub mod protocol;
pub mod request;
pub mod server;


pub use config::HttpConfig;
pub use protocol::HttpProtocolError;
pub use request::InboundRequest;
pub use server::InspectServer;
