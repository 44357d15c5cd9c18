use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::handlers::{self, AppState};

/// Largest accepted request body. A submission is a flat object of a few dozen fields.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// CORS policy for the single front-end origin: any method, any header,
/// credentials allowed. Methods and headers are mirrored because credentials
/// cannot be combined with wildcards. Requests from any other origin get no
/// `Access-Control-Allow-Origin` header.
pub fn cors_layer(allowed_origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(allowed_origin)
        .map_err(|_| anyhow::anyhow!("CORS origin {:?} is not a valid header value", allowed_origin))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Builds the HTTP application around the given state.
pub fn build_router(state: Arc<AppState>, allowed_origin: &str) -> anyhow::Result<Router> {
    let submission_routes = Router::new()
        .route("/submit-loan", post(handlers::submit_loan))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)));

    Ok(Router::new()
        .route("/health", get(handlers::health))
        .merge(submission_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origin)?))
}
