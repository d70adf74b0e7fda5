use crate::{
    routes::apply_routes,
    types::app_state::AppState,
    utils::{
        credential::ApiKey,
        mta_client::{MtaClient, MtaClientError, StopMonitoringQuery},
    },
};
use axum::Router;
use tower_http::cors::CorsLayer;

pub struct AppConfig {
    pub mta_host: String,
    pub mta_key: ApiKey,
    /// Stop queried when a request does not name one.
    pub stop: StopMonitoringQuery,
}

pub fn gen_app(config: AppConfig) -> Result<Router, MtaClientError> {
    let state = AppState {
        mta_client: MtaClient::new(config.mta_host, config.mta_key)?,
        stop: config.stop,
    };

    Ok(apply_routes(Router::new())
        .layer(CorsLayer::permissive())
        .with_state(state))
}

#[cfg(test)]
pub struct MockApp {
    pub app: Router,
    pub mta_server: mockito::ServerGuard,
}

#[cfg(test)]
pub async fn gen_mock_app() -> MockApp {
    let mta_server = mockito::Server::new_async().await;

    let app = gen_app(AppConfig {
        mta_host: mta_server.url(),
        mta_key: ApiKey::new("key"),
        stop: StopMonitoringQuery {
            monitoring_ref: "401041".to_string(),
            line_ref: "M104".to_string(),
            direction_ref: "N".to_string(),
        },
    })
    .expect("Failed to build app");

    MockApp { app, mta_server }
}
