//! Middlewares for the HTTP server.
//!
//! This module exposes tower [layers](tower::Layer) and related utilities to configure the axum
//! router. Most of the middlewares are registered as a layer on the [`Router`](axum::Router) in
//! [`make_app`](crate::make_app); [`resource_path`] wraps the router for the Lambda host only.

mod handle_panic;
mod request;
mod resource_path;
mod trace;

pub use self::handle_panic::*;
pub use self::request::*;
pub use self::resource_path::*;
pub use self::trace::*;
