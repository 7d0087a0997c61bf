use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use axum::Router;
use chrono::{DateTime, SecondsFormat, Utc};
use switchboard_config::{Bundle, Config};
use tower::ServiceBuilder;

use crate::endpoints;
use crate::middlewares::{self, CatchPanicLayer};

/// Tracks the boot of this function instance.
///
/// Created as early as possible in the process. The first request to [`take`](Self::take) the
/// cold start observes the total boot duration; every later request sees `None`.
pub struct ColdStart {
    booted_at: Instant,
    booted_at_utc: DateTime<Utc>,
    pending: AtomicBool,
}

impl ColdStart {
    /// Records the current instant as the boot time.
    pub fn now() -> Self {
        Self {
            booted_at: Instant::now(),
            booted_at_utc: Utc::now(),
            pending: AtomicBool::new(true),
        }
    }

    /// Returns the wall clock time at which the instance booted.
    pub fn booted_at(&self) -> DateTime<Utc> {
        self.booted_at_utc
    }

    /// Returns `true` until the first request has been observed.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Marks the cold start as handled and returns the time since boot.
    ///
    /// Returns `Some` exactly once, even if called concurrently.
    pub fn take(&self) -> Option<Duration> {
        self.pending
            .swap(false, Ordering::AcqRel)
            .then(|| self.booted_at.elapsed())
    }
}

impl fmt::Debug for ColdStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColdStart")
            .field("booted_at", &self.booted_at_utc)
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[derive(Debug)]
struct StateInner {
    config: Arc<Config>,
    bundle: Bundle,
    cold_start: ColdStart,
}

/// Server state shared by all requests.
#[derive(Clone, Debug)]
pub struct ServiceState {
    inner: Arc<StateInner>,
}

impl ServiceState {
    /// Creates the state from an already loaded bundle.
    pub fn new(config: Arc<Config>, bundle: Bundle, cold_start: ColdStart) -> Self {
        Self {
            inner: Arc::new(StateInner {
                config,
                bundle,
                cold_start,
            }),
        }
    }

    /// Logs the boot time and loads the configuration bundle.
    pub fn start(config: Arc<Config>, cold_start: ColdStart) -> Self {
        switchboard_log::info!(
            "cold start initialized at {}",
            cold_start
                .booted_at()
                .to_rfc3339_opts(SecondsFormat::Nanos, true)
        );

        let (bundle, _) = Bundle::load(config.bundle_path(), config.bundle_files());
        Self::new(config, bundle, cold_start)
    }

    /// Returns the service configuration.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Returns the configuration bundle.
    pub fn bundle(&self) -> &Bundle {
        &self.inner.bundle
    }

    /// Returns the cold start tracker.
    pub fn cold_start(&self) -> &ColdStart {
        &self.inner.cold_start
    }
}

/// Build the axum application with all routes and middleware.
pub fn make_app(state: ServiceState) -> Router {
    with_middlewares(endpoints::routes(), state)
}

fn with_middlewares(routes: Router<ServiceState>, state: ServiceState) -> Router {
    // Service builder order defines layers added first will be called first. This means:
    //  - Requests go from top to bottom
    //  - Responses go from bottom to top
    let middleware = ServiceBuilder::new()
        .layer(CatchPanicLayer::custom(middlewares::handle_panic))
        .layer(middlewares::trace_http_layer())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middlewares::track_request,
        ));

    routes.layer(middleware).with_state(state)
}
