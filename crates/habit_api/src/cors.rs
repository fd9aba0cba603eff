//! Request middleware: CORS for allow-listed origins and access logging.

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_HEADERS,
    ACCESS_CONTROL_REQUEST_METHOD, ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::info;
use std::sync::Arc;
use std::time::Instant;

const DEFAULT_ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";

/// Echoes allow-listed origins with credentials; answers their preflights with 204.
///
/// Requests from other origins pass through without CORS headers.
pub(crate) async fn cors(
    State(origins): State<Arc<[String]>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(origin) = allowed_origin(request.headers(), &origins) else {
        return next.run(request).await;
    };

    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        // Credentialed requests forbid `*`, so "any" means echoing the request.
        let methods = request
            .headers()
            .get(ACCESS_CONTROL_REQUEST_METHOD)
            .cloned()
            .unwrap_or(HeaderValue::from_static(DEFAULT_ALLOWED_METHODS));
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, methods);
        if let Some(requested) = request.headers().get(ACCESS_CONTROL_REQUEST_HEADERS) {
            headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
        }
        apply_origin(headers, origin);
        return response;
    }

    let mut response = next.run(request).await;
    apply_origin(response.headers_mut(), origin);
    response
}

fn allowed_origin(headers: &HeaderMap, origins: &[String]) -> Option<HeaderValue> {
    let origin = headers.get(ORIGIN)?;
    let text = origin.to_str().ok()?;
    origins
        .iter()
        .any(|allowed| allowed == text)
        .then(|| origin.clone())
}

fn apply_origin(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(VARY, HeaderValue::from_static("origin"));
}

/// Logs method, path, status and latency of every request.
pub(crate) async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;
    info!(
        "event=http_request module=api status={} method={method} path={path} duration_ms={}",
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origins() -> Vec<String> {
        vec!["http://localhost:5173".to_string()]
    }

    #[test]
    fn allowed_origin_requires_exact_match() {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_static("http://localhost:5173"));
        assert!(allowed_origin(&headers, &origins()).is_some());

        headers.insert(ORIGIN, HeaderValue::from_static("http://localhost:5174"));
        assert!(allowed_origin(&headers, &origins()).is_none());

        assert!(allowed_origin(&HeaderMap::new(), &origins()).is_none());
    }
}
