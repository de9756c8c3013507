use super::response::{internal_error, json_response};
use super::serializer::{DetailsSerializer, EncodeError, JsonSerializer};
use crate::inspect::{BasicDetails, ExtendedDetails};
use http::Response;
use std::sync::Arc;
use tracing::error;

/// Wraps serialized request details into HTTP responses
///
/// The two encode paths differ on purpose: `encode_basic` hands serialization
/// failures back to the caller so they reach the boundary handler, while
/// `encode_extended` turns them into the fixed 500 response itself.
///
/// # Examples
///
/// ```
/// use reqinspect::encode::ResponseEncoder;
/// use reqinspect::inspect::ExtendedDetails;
///
/// let encoder = ResponseEncoder::default();
/// let response = encoder.encode_extended(ExtendedDetails {
///     ip: "127.0.0.1".to_string(),
///     user_agent: Some("SomeUserAgent".to_string()),
///     headers: vec![],
/// });
///
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.body(), r#"{"ip":"127.0.0.1","userAgent":"SomeUserAgent","headers":[]}"#);
/// ```
#[derive(Clone)]
pub struct ResponseEncoder {
    serializer: Arc<dyn DetailsSerializer>,
}

impl ResponseEncoder {
    /// Creates an encoder around the given serializer
    pub fn new(serializer: Arc<dyn DetailsSerializer>) -> Self {
        Self { serializer }
    }

    /// Serializes basic details; errors propagate to the caller
    pub fn encode_basic(&self, details: BasicDetails) -> Result<Response<String>, EncodeError> {
        let body = self.serializer.serialize(&details.into())?;
        Ok(json_response(body))
    }

    /// Serializes extended details, answering 500 locally if serialization fails
    pub fn encode_extended(&self, details: ExtendedDetails) -> Response<String> {
        match self.serializer.serialize(&details.into()) {
            Ok(body) => json_response(body),
            Err(e) => {
                error!(error = %e, "Failed to serialize request details");
                internal_error()
            }
        }
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self::new(Arc::new(JsonSerializer))
    }
}

impl std::fmt::Debug for ResponseEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseEncoder").finish_non_exhaustive()
    }
}
