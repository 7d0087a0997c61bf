use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Serialize;

/// Body of an echo request.
///
/// The body must be a JSON object or `null`. A missing or `null` name greets the empty name.
#[derive(Debug, Default)]
struct EchoRequest {
    name: String,
}

switchboard_config::decode_fields!(EchoRequest { name });

#[derive(Debug, Serialize)]
struct EchoResponse {
    message: String,
}

fn parse_request(body: &[u8]) -> Result<EchoRequest, serde_json::Error> {
    serde_json::from_slice(body)
}

pub async fn handle(body: Bytes) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(error) => {
            switchboard_log::debug!("invalid echo body: {error}");
            return (StatusCode::BAD_REQUEST, "Invalid Request Body").into_response();
        }
    };

    let response = EchoResponse {
        message: format!("Hello {} from POST!", request.name),
    };

    match serde_json::to_string(&response) {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response(),
        Err(error) => {
            switchboard_log::error!("failed to serialize echo response: {error}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use super::*;
    use crate::testutils::{empty_app, send};

    #[tokio::test]
    async fn test_echo() {
        let response = send(empty_app(), Method::POST, "/echo", r#"{"name": "Ada"}"#).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(
            response.json(),
            serde_json::json!({"message": "Hello Ada from POST!"})
        );
    }

    #[tokio::test]
    async fn test_echo_invalid_body() {
        for body in [
            "",
            "not json",
            r#"{"name": 42}"#,
            r#"["Ada"]"#,
            r#"{"name": "Ada"} x"#,
            r#""Ada""#,
            "[]",
            "7",
        ] {
            let response = send(empty_app(), Method::POST, "/echo", body).await;

            assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body:?}");
            assert_eq!(response.body, "Invalid Request Body");
        }
    }

    #[test]
    fn test_missing_or_null_name() {
        for body in ["{}", r#"{"name": null}"#, "null", r#"{"other": 1}"#] {
            let request = parse_request(body.as_bytes()).unwrap();
            assert_eq!(request.name, "", "{body}");
        }
    }

    #[test]
    fn test_name_key_ignores_case_and_last_wins() {
        for (body, name) in [
            (r#"{"NAME": "Ada"}"#, "Ada"),
            (r#"{"Name": "Ada"}"#, "Ada"),
            (r#"{"name": "a", "name": "b"}"#, "b"),
            (r#"{"name": "a", "NAME": "b"}"#, "b"),
            (r#"{"name": "a", "name": null}"#, "a"),
        ] {
            let request = parse_request(body.as_bytes()).unwrap();
            assert_eq!(request.name, name, "{body}");
        }
    }

    #[tokio::test]
    async fn test_echo_array_body_rejected() {
        let response = send(empty_app(), Method::POST, "/echo", r#"[{"name": "Ada"}]"#).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body, "Invalid Request Body");
    }

    #[tokio::test]
    async fn test_echo_empty_name() {
        let response = send(empty_app(), Method::POST, "/echo", "{}").await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, r#"{"message":"Hello  from POST!"}"#);
    }

    #[tokio::test]
    async fn test_echo_escapes_name() {
        let response = send(empty_app(), Method::POST, "/echo", r#"{"name": "\"quoted\""}"#).await;

        assert_eq!(
            response.json(),
            serde_json::json!({"message": "Hello \"quoted\" from POST!"})
        );
    }
}
