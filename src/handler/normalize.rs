use super::HandlerResult;
use crate::encode::internal_error;
use http::Response;
use tracing::error;

/// Boundary handler: turns any error that escaped a handler into the fixed 500
///
/// Successful responses pass through untouched. Error kinds are not
/// distinguished and no error detail reaches the response body.
pub fn normalize(result: HandlerResult) -> Response<String> {
    result.unwrap_or_else(|e| {
        error!(error = %e, "Unhandled error while processing request");
        internal_error()
    })
}
