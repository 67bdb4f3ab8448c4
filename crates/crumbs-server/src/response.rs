//! JSON response helpers

use crumbs_service::ServiceError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use hyper::{Response, StatusCode};
use serde::Serialize;
use tracing::error;

pub type HttpResponse = Response<Full<Bytes>>;

/// Serialize `value` as the response body
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> HttpResponse {
    match serde_json::to_vec(value) {
        Ok(body) => with_body(status, body),
        Err(e) => {
            error!(error = %e, "failed to serialize response");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// `{"success": false, "error": message}`
pub fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "success": false, "error": message });
    with_body(status, body.to_string().into_bytes())
}

/// Map a service failure onto a status code.
///
/// Storage details stay in the logs.
pub fn service_error_response(err: &ServiceError) -> HttpResponse {
    match err {
        ServiceError::UnknownUpgrade(_) => error_response(StatusCode::NOT_FOUND, &err.to_string()),
        ServiceError::Conflict { .. } => error_response(StatusCode::CONFLICT, &err.to_string()),
        ServiceError::StorageUnavailable(_) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable")
        }
    }
}

pub fn empty_response(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

pub fn apply_cors(response: &mut HttpResponse, origin: &HeaderValue) {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}

fn with_body(status: StatusCode, body: Vec<u8>) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
