use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::service::ServiceState;

/// Logs the lifecycle of every request and resolves the cold start.
///
/// The first request served by this instance logs the total boot duration.
pub async fn track_request(
    State(state): State<ServiceState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    if let Some(boot_duration) = state.cold_start().take() {
        switchboard_log::info!(
            "processing first request after cold start, total boot duration {boot_duration:?}"
        );
    }

    switchboard_log::info!(
        "processing request {} {}",
        request.method(),
        request.uri().path()
    );
    switchboard_log::debug!(
        "request: {} {} {:?} headers={:?}",
        request.method(),
        request.uri(),
        request.version(),
        request.headers()
    );

    let response = next.run(request).await;

    switchboard_log::info!("request completed in {:?}", start.elapsed());
    response
}
