use crate::inspect::RequestDetails;
use thiserror::Error;

/// Errors raised while turning request details into a response body
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Turns request details into a string body
///
/// Implementations hold no per-request state and are shared between
/// connections behind an `Arc`.
pub trait DetailsSerializer: Send + Sync {
    fn serialize(&self, details: &RequestDetails) -> Result<String, EncodeError>;
}

/// Compact JSON serializer backed by `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl DetailsSerializer for JsonSerializer {
    fn serialize(&self, details: &RequestDetails) -> Result<String, EncodeError> {
        Ok(serde_json::to_string(details)?)
    }
}
