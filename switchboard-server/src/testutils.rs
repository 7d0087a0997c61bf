use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use switchboard_config::{Bundle, Config, Document};
use tower::ServiceExt;

use crate::service::{ColdStart, ServiceState, make_app};

/// Creates service state holding the given documents.
pub fn state_with(documents: impl IntoIterator<Item = (&'static str, Document)>) -> ServiceState {
    let bundle: Bundle = documents
        .into_iter()
        .map(|(name, document)| (name.to_owned(), document))
        .collect();

    ServiceState::new(Arc::new(Config::default()), bundle, ColdStart::now())
}

/// Creates the application with an empty bundle.
pub fn empty_app() -> Router {
    let state = ServiceState::new(
        Arc::new(Config::default()),
        Bundle::default(),
        ColdStart::now(),
    );
    make_app(state)
}

/// A response with its body collected into a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Sends a single request through the application.
pub async fn send(app: Router, method: Method, uri: &str, body: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_owned()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    TestResponse {
        status: parts.status,
        headers: parts.headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}
