use crate::{
    types::app_state::AppState,
    utils::{app_error::AppError, mta_client::StopMonitoringQuery, validated_query::ValidatedQuery},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
#[cfg(test)]
use axum_macros::debug_handler;
use serde::{Deserialize, Serialize};
use validator::Validate;

const MAX_ARRIVALS: usize = 3;

#[derive(Serialize, Deserialize)]
pub struct TransitArrival {
    pub vehicle_id: String,
    pub expected_arrival_time: String,
    pub minutes_until_arrival: i64,
}

#[derive(Serialize, Deserialize)]
pub struct TransitArrivalTimesData {
    pub arrivals: Vec<TransitArrival>,
}

#[derive(Serialize, Deserialize)]
pub struct TransitArrivalTimesResponse {
    pub data: TransitArrivalTimesData,
}

#[derive(Validate, Deserialize)]
pub struct GetTransitArrivalTimesPayload {
    #[validate(length(min = 1, message = "Must be at least 1 character"))]
    pub stop_id: Option<String>,
    #[validate(length(min = 1, message = "Must be at least 1 character"))]
    pub line_ref: Option<String>,
    #[validate(length(min = 1, message = "Must be at least 1 character"))]
    pub direction_ref: Option<String>,
}

#[cfg_attr(test, debug_handler)]
pub async fn get_transit_arrival_times(
    State(state): State<AppState>,
    ValidatedQuery(payload): ValidatedQuery<GetTransitArrivalTimesPayload>,
) -> Result<Response, AppError> {
    let query = StopMonitoringQuery {
        monitoring_ref: payload.stop_id.unwrap_or(state.stop.monitoring_ref),
        line_ref: payload.line_ref.unwrap_or(state.stop.line_ref),
        direction_ref: payload.direction_ref.unwrap_or(state.stop.direction_ref),
    };

    let arrivals = state
        .mta_client
        .fetch_upcoming_arrivals(&query, MAX_ARRIVALS)
        .await
        .map_err(|e| AppError::upstream("Failed to fetch arrival times", e))?
        .into_iter()
        .map(|a| TransitArrival {
            vehicle_id: a.vehicle_id,
            expected_arrival_time: a.expected_arrival_time,
            minutes_until_arrival: a.minutes_until_arrival,
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(TransitArrivalTimesResponse {
            data: TransitArrivalTimesData { arrivals },
        }),
    )
        .into_response())
}
