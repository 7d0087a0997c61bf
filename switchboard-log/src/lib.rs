//! Logging facade for Switchboard.
//!
//! # Setup
//!
//! With the `init` feature, invoke the `init` function with a `LogConfig` to enable logging. The
//! configuration implements `serde` traits, so it can be obtained from the service configuration
//! file.
//!
//! # Logging
//!
//! Use the five logging macros: [`error!`], [`warn!`], [`info!`], [`debug!`] and [`trace!`], where
//! `error!` represents the highest-priority log messages and `trace!` the lowest. Each of these
//! macros accept format strings similarly to [`println!`].
//!
//! ## Conventions
//!
//! Log messages should start lowercase and end without punctuation. Prefer short and precise log
//! messages over verbose text. Choose the log level according to these rules:
//!
//! - [`error!`] for bugs and invalid behavior.
//! - [`warn!`] for undesirable behavior.
//! - [`info!`] for messages relevant to the operator of a function, such as cold starts.
//! - [`debug!`] for messages usually relevant to debugging.
//! - [`trace!`] for full auxiliary information.
//!
//! ## Logging Error Types
//!
//! To log errors with their full chain of causes, use the [`LogError`] wrapper.
//!
//! ```
//! use std::io::{Error, ErrorKind};
//! use switchboard_log::LogError;
//!
//! let custom_error = Error::new(ErrorKind::Other, "oh no!");
//! switchboard_log::error!("operation failed: {}", LogError(&custom_error));
//! ```
//!
//! # Testing
//!
//! With the `test` feature, call the initialization macro `init_test!` at the beginning of a test
//! method. It routes logs of all Switchboard crates to the test output, unless `RUST_LOG` selects
//! otherwise.

#![warn(missing_docs)]

#[cfg(feature = "init")]
mod setup;
#[cfg(feature = "init")]
pub use setup::*;

#[cfg(feature = "test")]
pub use test::*;

mod utils;
pub use utils::*;

// Expose the minimal log facade.
#[doc(inline)]
pub use tracing::{Level, debug, error, info, trace, warn};
