use axum::Router;
use tower::util::MapRequest;

use crate::middlewares;
use crate::server::ServerError;
use crate::service::{ServiceState, make_app};

/// The service stack handling decoded API Gateway proxy events.
pub type LambdaService = MapRequest<Router, fn(lambda_http::Request) -> lambda_http::Request>;

/// Builds the router for the Lambda host.
///
/// Requests are routed on the API Gateway resource path, see
/// [`resource_path`](middlewares::resource_path).
pub fn make_lambda_service(state: ServiceState) -> LambdaService {
    MapRequest::new(make_app(state), middlewares::resource_path as fn(_) -> _)
}

/// Serves events from the Lambda runtime until it fails.
pub async fn serve(state: ServiceState) -> Result<(), ServerError> {
    let service = make_lambda_service(state);

    switchboard_log::info!("starting lambda handler");
    lambda_http::run(service).await.map_err(ServerError::Lambda)
}
