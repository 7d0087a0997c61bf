use axum::body::Body;
use axum::http::Request;
use lambda_http::RequestExt;
use switchboard_log::Level;
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{
    DefaultOnBodyChunk, DefaultOnEos, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse,
    TraceLayer,
};
use tracing::Span;

/// Tracing layer of the router, see [`trace_http_layer`].
pub type HttpTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    fn(&Request<Body>) -> Span,
    DefaultOnRequest,
    DefaultOnResponse,
    DefaultOnBodyChunk,
    DefaultOnEos,
    DefaultOnFailure,
>;

/// Opens a span per request.
///
/// Events decoded from the Lambda runtime carry the invocation's request id.
fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .lambda_context_ref()
        .map(|context| context.request_id.as_str());

    tracing::debug_span!(
        "request",
        method = %request.method(),
        path = request.uri().path(),
        request_id,
    )
}

pub fn trace_http_layer() -> HttpTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(request_span as fn(&Request<Body>) -> Span)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::DEBUG)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().level(Level::DEBUG))
}
