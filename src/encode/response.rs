use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Response, StatusCode};

/// Body of every 500 response, whichever layer produced it
pub const INTERNAL_ERROR_BODY: &str = "Erro interno ao processar a requisição";

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// 200 response carrying a JSON body
pub fn json_response(body: String) -> Response<String> {
    with_content_type(StatusCode::OK, body, JSON_CONTENT_TYPE)
}

/// Plain-text response with the given status
pub fn text_response(status: StatusCode, body: impl Into<String>) -> Response<String> {
    with_content_type(status, body.into(), TEXT_CONTENT_TYPE)
}

/// The fixed 500 response
pub fn internal_error() -> Response<String> {
    text_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_BODY)
}

fn with_content_type(status: StatusCode, body: String, content_type: &'static str) -> Response<String> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
