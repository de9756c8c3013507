use super::{HandlerError, HandlerResult};
use crate::encode::ResponseEncoder;
use crate::inspect::{RequestView, basic_details, extended_details};
use tracing::info;

/// Message carried by the error raised from the `/error` endpoint
pub const SIMULATED_ERROR: &str = "Erro simulado para teste";

/// `GET /ip`: caller ip, User-Agent, method and URL
pub fn ip<R: RequestView>(request: &R, encoder: &ResponseEncoder) -> HandlerResult {
    let details = basic_details(request);

    info!(
        ip = %details.ip,
        user_agent = details.user_agent.as_deref().unwrap_or("-"),
        method = %details.method,
        url = %details.url,
        "Inspecting request"
    );

    Ok(encoder.encode_basic(details)?)
}

/// `GET /details`: caller ip, User-Agent and header names
pub fn details<R: RequestView>(request: &R, encoder: &ResponseEncoder) -> HandlerResult {
    Ok(encoder.encode_extended(extended_details(request)))
}

/// `GET /error`: always fails
pub fn error() -> HandlerResult {
    Err(HandlerError::Runtime(SIMULATED_ERROR.to_string()))
}
