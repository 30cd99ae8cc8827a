use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use storage_app::AppError;
use tracing::debug;

use crate::{
    errors::HttpError,
    state::{HttpState, TOKEN_HEADER},
};

/// Rejects `/api` calls without the configured token. Open when no token is set.
pub async fn require_token(
    State(state): State<HttpState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    if let Some(expected) = &state.api_token {
        let token = req
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        if token != Some(expected.as_str()) {
            debug!(path = %req.uri().path(), "request without a valid token");
            return Err(HttpError::from(AppError::Unauthorized));
        }
    }

    Ok(next.run(req).await)
}
