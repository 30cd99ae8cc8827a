mod errors;
mod handlers;
mod middleware;
mod state;

use axum::{Router, middleware as axum_middleware, routing::get};

pub use errors::HttpError;
pub use state::{HttpState, TOKEN_HEADER};

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route(
            "/used_space",
            get(handlers::used_space).post(handlers::used_space),
        )
        .route(
            "/used_space_per_org",
            get(handlers::used_space_per_org).post(handlers::used_space_per_org),
        )
        .route(
            "/unattributed_space",
            get(handlers::unattributed_space).post(handlers::unattributed_space),
        )
        .route(
            "/usage_report",
            get(handlers::usage_report).post(handlers::usage_report),
        )
        .route("/units", get(handlers::units))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_token,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .fallback(handlers::not_found)
        .with_state(state)
}
