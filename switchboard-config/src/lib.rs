//! Configuration for the Switchboard CLI and server.
//!
//! Switchboard deals with two kinds of configuration:
//!
//!  - The [service configuration](Config) controls how the function runs: the local listen
//!    address, logging, and where to find the configuration bundle. It is read from `config.yml`
//!    in the config folder and may be overridden from the command line or the environment through
//!    [`OverridableConfig`].
//!  - The [configuration bundle](Bundle) is the set of JSON documents that is loaded once at cold
//!    start and served read-only by the `/config` endpoint.
//!
//! # Service Configuration
//!
//! All sections are optional, a missing file is equivalent to an empty one:
//!
//! ```yaml
//! server:
//!   host: 127.0.0.1
//!   port: 3000
//!   shutdown_timeout: 10
//! logging:
//!   level: info
//!   format: auto
//! bundle:
//!   path: .
//!   files:
//!     - config.json
//!     - config_1.json
//! ```

#![warn(missing_docs)]

mod bundle;
mod config;
pub mod fields;

pub use self::bundle::*;
pub use self::config::*;
