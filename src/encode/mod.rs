//! JSON encoding of request details
//!
//! [`ResponseEncoder`] turns a [`crate::inspect::RequestDetails`] value into an
//! HTTP response. The JSON step sits behind the [`DetailsSerializer`] trait so a
//! failing serializer can be injected in tests.

pub mod encoder;
pub mod response;
pub mod serializer;

pub use encoder::ResponseEncoder;
pub use response::{INTERNAL_ERROR_BODY, internal_error, json_response, text_response};
pub use serializer::{DetailsSerializer, EncodeError, JsonSerializer};
