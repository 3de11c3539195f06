//! API Middleware
//!
//! Per-request span and access log.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

/// Header carrying the per-request identifier
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Route parameter naming the venue a request targets
const VENUE_ID_PARAM: &str = ":venue_id";

/// Value of the `:venue_id` segment when `route` declares one.
pub fn venue_id_from_path<'a>(route: &str, path: &'a str) -> Option<&'a str> {
    route
        .split('/')
        .zip(path.split('/'))
        .find(|(pattern, _)| *pattern == VENUE_ID_PARAM)
        .map(|(_, segment)| segment)
        .filter(|segment| !segment.is_empty())
}

/// Wrap the request in a span tagged with its id, route and venue, then log
/// the outcome with its latency.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    // Set by the request-id layer before this middleware runs
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let venue_id = venue_id_from_path(&route, request.uri().path()).map(str::to_string);

    let span = tracing::info_span!(
        "request",
        method = %request.method(),
        route = %route,
        request_id = %request_id,
        venue_id = venue_id.as_deref().unwrap_or(""),
    );

    async move {
        let start = std::time::Instant::now();
        let response = next.run(request).await;
        let status = response.status();
        let duration_ms = start.elapsed().as_millis() as u64;

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), duration_ms, "Request failed");
        } else {
            tracing::info!(status = status.as_u16(), duration_ms, "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}
