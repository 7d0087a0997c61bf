//! Web server endpoints.
//!
//! Routes match the exact path and method. A known path requested with another method is treated
//! like an unknown path and answered by [`statics::not_found`].

use axum::Router;
use axum::routing::{get, post};

use crate::service::ServiceState;

mod config;
mod echo;
mod hello;
mod statics;

pub fn routes() -> Router<ServiceState> {
    // `get` also serves HEAD requests, which are not part of the routing table.
    Router::new()
        .route(
            "/hello",
            get(hello::handle)
                .head(statics::not_found)
                .fallback(statics::not_found),
        )
        .route("/echo", post(echo::handle).fallback(statics::not_found))
        .route(
            "/config",
            get(config::handle)
                .head(statics::not_found)
                .fallback(statics::not_found),
        )
        .fallback(statics::not_found)
}
