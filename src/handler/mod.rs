//! Request routing and error normalization
//!
//! Every endpoint returns a [`HandlerResult`]. [`Api::dispatch`] picks the
//! endpoint for a request, runs it with panics caught, and feeds the result
//! through [`normalize`] so that no failure leaves this layer as anything
//! other than the fixed 500 response.

pub mod api;
pub mod normalize;


pub use normalize::normalize;

use crate::encode::{EncodeError, ResponseEncoder, text_response};
use crate::http::InboundRequest;
use crate::inspect::RequestView;
use http::header::{ALLOW, HeaderValue};
use http::{Method, Response, StatusCode};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::info;

/// Failures a handler can hand to the boundary
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] EncodeError),
    #[error("{0}")]
    Runtime(String),
    #[error("Handler panicked: {0}")]
    Panic(String),
}

/// Outcome of a single endpoint
pub type HandlerResult = std::result::Result<Response<String>, HandlerError>;

/// Endpoints served under the path prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Ip,
    Details,
    Error,
}

/// The diagnostic endpoints mounted under a path prefix
#[derive(Debug, Clone)]
pub struct Api {
    prefix: String,
    encoder: ResponseEncoder,
}

impl Api {
    /// Creates the endpoint set under `prefix`
    ///
    /// Leading and trailing slashes are normalized, so `api`, `/api` and
    /// `/api/` are the same prefix. An empty prefix mounts at the root.
    pub fn new(prefix: impl AsRef<str>, encoder: ResponseEncoder) -> Self {
        let trimmed = prefix.as_ref().trim_matches('/');
        let prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        Self { prefix, encoder }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Matches a request path (no query string) to an endpoint
    pub fn route(&self, path: &str) -> Option<Route> {
        match path.strip_prefix(self.prefix.as_str())? {
            "/ip" => Some(Route::Ip),
            "/details" => Some(Route::Details),
            "/error" => Some(Route::Error),
            _ => None,
        }
    }

    /// Runs an endpoint without the boundary handler
    pub fn handle<R: RequestView>(&self, route: Route, request: &R) -> HandlerResult {
        match route {
            Route::Ip => api::ip(request, &self.encoder),
            Route::Details => api::details(request, &self.encoder),
            Route::Error => api::error(),
        }
    }

    /// Produces the response for a request
    pub fn dispatch(&self, request: &InboundRequest) -> Response<String> {
        let path = request.path();

        let response = match self.route(path) {
            None => text_response(StatusCode::NOT_FOUND, "Not Found"),
            Some(_) if *request.http_method() != Method::GET => method_not_allowed(),
            Some(route) => normalize(self.guarded(route, request)),
        };

        info!(
            method = %request.http_method(),
            path,
            status = response.status().as_u16(),
            "Handled request"
        );
        response
    }

    fn guarded<R: RequestView>(&self, route: Route, request: &R) -> HandlerResult {
        panic::catch_unwind(AssertUnwindSafe(|| self.handle(route, request)))
            .unwrap_or_else(|payload| Err(HandlerError::Panic(panic_message(payload.as_ref()))))
    }
}

impl Default for Api {
    fn default() -> Self {
        Self::new("/api", ResponseEncoder::default())
    }
}

fn method_not_allowed() -> Response<String> {
    let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET"));
    response
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
