use axum::{routing::get, Router};

use crate::types::app_state::AppState;

mod get_health;
mod get_stop_monitoring;
mod get_transit_arrival_times;

pub fn apply_routes(app: Router<AppState>) -> Router<AppState> {
    app.route("/health", get(get_health::get_health))
        .route(
            "/api/mta/stop-monitoring",
            get(get_stop_monitoring::get_stop_monitoring),
        )
        .route(
            "/transit-arrival-times",
            get(get_transit_arrival_times::get_transit_arrival_times),
        )
}
