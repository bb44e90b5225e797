//! Response middleware: CORS headers and preflight answers.

use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS};
use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE};
use hyper::{body::Bytes, Response};

use crate::handlers::request_utils::build_empty_response;
use crate::router::RouterError;

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Adds permissive CORS headers; the UI may be served from another origin
/// during development.
pub fn with_cors<B>(mut response: Response<B>) -> Response<B> {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    response
}

/// Answer to a CORS preflight request.
pub fn preflight_response() -> Result<Response<Bytes>, RouterError> {
    let mut response = build_empty_response(204)?;
    response
        .headers_mut()
        .insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("600"));
    Ok(response)
}
