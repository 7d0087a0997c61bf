use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;

use crate::utils::ApiErrorResponse;

/// An endpoint function that always responds with `404 Not Found`.
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    switchboard_log::info!("not found: {method} {}", uri.path());
    (
        StatusCode::NOT_FOUND,
        ApiErrorResponse::with_detail("Not Found"),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::testutils::{empty_app, send};

    #[tokio::test]
    async fn test_unknown_path() {
        let response = send(empty_app(), Method::GET, "/missing", "").await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.json(), serde_json::json!({"error": "Not Found"}));
    }
}
