use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::service::ServiceState;
use crate::utils::ApiErrorResponse;

/// Returns all loaded configuration documents keyed by file name.
pub async fn handle(State(state): State<ServiceState>) -> Response {
    let bundle = state.bundle();

    if bundle.is_empty() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorResponse::with_detail("No configurations loaded"),
        )
            .into_response();
    }

    match serde_json::to_string(bundle) {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response(),
        Err(error) => {
            switchboard_log::error!("failed to serialize configurations: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorResponse::with_detail("Failed to marshal config"),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use insta::assert_json_snapshot;
    use switchboard_config::{DatabaseSection, Document, ServiceEndpoint};

    use crate::service::make_app;
    use crate::testutils::{empty_app, send, state_with};

    #[tokio::test]
    async fn test_no_configurations() {
        let response = send(empty_app(), Method::GET, "/config", "").await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json(),
            serde_json::json!({"error": "No configurations loaded"})
        );
    }

    #[tokio::test]
    async fn test_configurations() {
        let primary = Document {
            database: DatabaseSection {
                host: "db.internal".to_owned(),
                port: 5432,
                max_connections: 20,
                ..Default::default()
            },
            services: Some(vec![ServiceEndpoint {
                name: "billing".to_owned(),
                url: "https://billing.internal".to_owned(),
                retries: 3,
            }]),
            ..Default::default()
        };

        let app = make_app(state_with([
            ("config_1.json", Document::default()),
            ("config.json", primary),
        ]));

        let response = send(app, Method::GET, "/config", "").await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content_type(), Some("application/json"));

        insta::with_settings!({ sort_maps => true }, {
            assert_json_snapshot!(response.json(), @r###"
            {
              "config.json": {
                "database": {
                  "host": "db.internal",
                  "max_connections": 20,
                  "password": "",
                  "port": 5432,
                  "timeout": 0,
                  "username": ""
                },
                "features": {
                  "beta_users": null,
                  "enable_feature_x": false,
                  "enable_feature_y": false
                },
                "large_data": "",
                "logging": {
                  "format": "",
                  "level": "",
                  "output": ""
                },
                "services": [
                  {
                    "name": "billing",
                    "retries": 3,
                    "url": "https://billing.internal"
                  }
                ]
              },
              "config_1.json": {
                "database": {
                  "host": "",
                  "max_connections": 0,
                  "password": "",
                  "port": 0,
                  "timeout": 0,
                  "username": ""
                },
                "features": {
                  "beta_users": null,
                  "enable_feature_x": false,
                  "enable_feature_y": false
                },
                "large_data": "",
                "logging": {
                  "format": "",
                  "level": "",
                  "output": ""
                },
                "services": null
              }
            }
            "###);
        });
    }

    #[tokio::test]
    async fn test_body_keys_are_sorted() {
        let app = make_app(state_with([
            ("config_4.json", Document::default()),
            ("config.json", Document::default()),
        ]));

        let response = send(app, Method::GET, "/config", "").await;
        let first = response.body.find("\"config.json\"").unwrap();
        let last = response.body.find("\"config_4.json\"").unwrap();
        assert!(first < last);
    }
}
