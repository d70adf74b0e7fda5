use crate::{types::app_state::AppState, utils::app_error::AppError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub async fn get_stop_monitoring(State(state): State<AppState>) -> Result<Response, AppError> {
    let body = state
        .mta_client
        .fetch_stop_monitoring(&state.stop)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch stop monitoring", e))?;

    Ok((StatusCode::OK, Json(body)).into_response())
}
