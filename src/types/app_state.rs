use crate::utils::mta_client::{MtaClient, StopMonitoringQuery};

#[derive(Clone)]
pub struct AppState {
    pub mta_client: MtaClient,
    pub stop: StopMonitoringQuery,
}
