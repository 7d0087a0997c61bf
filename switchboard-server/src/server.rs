use std::io;
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use axum_server::Handle;

use crate::service::{ServiceState, make_app};

/// Indicates the type of failure of the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding failed.
    #[error("bind to interface failed")]
    BindFailed(#[source] io::Error),

    /// The HTTP server stopped with an error.
    #[error("http server failed")]
    ServeFailed(#[source] io::Error),

    /// The async runtime could not be created.
    #[error("could not start the async runtime")]
    Runtime(#[source] io::Error),

    /// The Lambda runtime stopped with an error.
    #[error("lambda runtime failed")]
    Lambda(#[source] lambda_http::Error),
}

fn listen(addr: SocketAddr) -> io::Result<TcpListener> {
    let listener = TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

async fn shutdown_on_ctrl_c(handle: Handle, timeout: Duration) {
    if let Err(error) = tokio::signal::ctrl_c().await {
        switchboard_log::warn!("cannot listen for shutdown signal: {error}");
        return;
    }

    switchboard_log::info!("shutting down http server");
    handle.graceful_shutdown(Some(timeout));
}

/// Local HTTP server.
///
/// Hosts the same routes as the Lambda function for development and testing. The server stops
/// gracefully on `Ctrl-C`, waiting at most for the configured shutdown timeout.
pub struct HttpServer {
    state: ServiceState,
    listener: TcpListener,
}

impl HttpServer {
    /// Binds the listen address of the service configuration.
    pub fn new(state: ServiceState) -> Result<Self, ServerError> {
        let listener = listen(state.config().listen_addr()).map_err(ServerError::BindFailed)?;
        Ok(Self { state, listener })
    }

    /// Returns the address the server is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until shutdown.
    pub async fn serve(self) -> Result<(), ServerError> {
        let Self { state, listener } = self;

        let listen_addr = listener.local_addr().map_err(ServerError::BindFailed)?;
        let shutdown_timeout = state.config().shutdown_timeout();

        switchboard_log::info!("spawning http server");
        switchboard_log::info!("  listening on http://{listen_addr}/");

        let handle = Handle::new();
        tokio::spawn(shutdown_on_ctrl_c(handle.clone(), shutdown_timeout));

        let app = make_app(state);
        axum_server::from_tcp(listener)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .map_err(ServerError::ServeFailed)
    }
}
