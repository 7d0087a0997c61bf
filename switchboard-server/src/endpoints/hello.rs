use axum::http::Uri;

pub async fn handle(uri: Uri) -> String {
    format!("Hello from GET! Path: {}", uri.path())
}
