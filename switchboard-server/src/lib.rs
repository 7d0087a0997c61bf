//! Endpoints, middlewares and hosts for Switchboard.
//!
//! Switchboard answers three routes:
//!
//!  - `GET /hello` greets with the requested path.
//!  - `POST /echo` greets the `name` of a JSON body.
//!  - `GET /config` returns the [configuration bundle](switchboard_config::Bundle) loaded at cold
//!    start.
//!
//! Every other method and path yields `404 Not Found`.
//!
//! The same [router](make_app) is hosted in one of two ways, see [`RunMode`]:
//!
//!  - Inside the AWS Lambda runtime, where API Gateway proxy events are decoded into HTTP
//!    requests by `lambda_http`.
//!  - As a plain HTTP server for local development.
#![warn(missing_docs)]

mod endpoints;
mod lambda;
mod middlewares;
mod server;
mod service;
mod utils;

#[cfg(test)]
mod testutils;

use std::sync::Arc;

use switchboard_config::Config;

pub use self::lambda::{LambdaService, make_lambda_service};
pub use self::server::{HttpServer, ServerError};
pub use self::service::{ColdStart, ServiceState, make_app};
pub use self::utils::ApiErrorResponse;

/// Environment variable set by the Lambda execution environment.
const LAMBDA_RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";

/// Selects how the router is hosted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunMode {
    /// Serve API Gateway proxy events from the Lambda runtime.
    Lambda,
    /// Serve HTTP on the configured listen address.
    Http,
}

impl RunMode {
    /// Picks [`RunMode::Lambda`] inside the Lambda execution environment, otherwise
    /// [`RunMode::Http`].
    pub fn detect() -> Self {
        if std::env::var_os(LAMBDA_RUNTIME_API_ENV).is_some() {
            RunMode::Lambda
        } else {
            RunMode::Http
        }
    }
}

/// Runs the function until the host stops.
///
/// This loads the configuration bundle, then blocks serving requests. In Lambda mode, this only
/// returns when the runtime fails. In HTTP mode, it returns after a graceful shutdown on `Ctrl-C`.
pub fn run(config: Config, mode: RunMode, cold_start: ColdStart) -> Result<(), ServerError> {
    let runtime = match mode {
        // Lambda hands out one event at a time, a single thread keeps the cold start short.
        RunMode::Lambda => tokio::runtime::Builder::new_current_thread(),
        RunMode::Http => tokio::runtime::Builder::new_multi_thread(),
    }
    .thread_name("switchboard")
    .enable_all()
    .build()
    .map_err(ServerError::Runtime)?;

    runtime.block_on(async move {
        let state = ServiceState::start(Arc::new(config), cold_start);

        match mode {
            RunMode::Lambda => lambda::serve(state).await,
            RunMode::Http => HttpServer::new(state)?.serve().await,
        }
    })
}
