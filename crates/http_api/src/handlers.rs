use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use app_api::EmptyRequest;

use crate::{errors::HttpError, state::HttpState};

/// GET requests carry no body; POST bodies must be a JSON object.
fn request_body(
    body: Result<Json<EmptyRequest>, JsonRejection>,
) -> Result<EmptyRequest, HttpError> {
    match body {
        Ok(Json(req)) => Ok(req),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(EmptyRequest::default()),
        Err(rejection) => Err(HttpError::new(
            StatusCode::BAD_REQUEST,
            rejection.body_text(),
            Some("invalid_input".to_string()),
        )),
    }
}

pub async fn used_space(
    State(state): State<HttpState>,
    body: Result<Json<EmptyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let req = request_body(body)?;
    let response = app_api::used_space(&state.context, req).await?;
    Ok(Json(response))
}

pub async fn used_space_per_org(
    State(state): State<HttpState>,
    body: Result<Json<EmptyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let req = request_body(body)?;
    let response = app_api::used_space_per_org(&state.context, req).await?;
    Ok(Json(response))
}

pub async fn unattributed_space(
    State(state): State<HttpState>,
    body: Result<Json<EmptyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let req = request_body(body)?;
    let response = app_api::unattributed_space(&state.context, req).await?;
    Ok(Json(response))
}

pub async fn usage_report(
    State(state): State<HttpState>,
    body: Result<Json<EmptyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let req = request_body(body)?;
    let response = app_api::usage_report(&state.context, req).await?;
    Ok(Json(response))
}

pub async fn units() -> impl IntoResponse {
    Json(app_api::units())
}

pub async fn health() -> impl IntoResponse {
    Json(app_api::health())
}

pub async fn not_found() -> HttpError {
    HttpError::new(
        StatusCode::NOT_FOUND,
        "no such endpoint",
        Some("not_found".to_string()),
    )
}
