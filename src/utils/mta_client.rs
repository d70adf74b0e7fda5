use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use urlencoding::encode;

use crate::{
    types::mta_stop_monitoring_response::{GetStopMonitoringResponse, MonitoredStopVisit},
    utils::credential::ApiKey,
};

pub const DEFAULT_MTA_HOST: &str = "https://bustime.mta.info";
pub const USER_AGENT: &str = "MTA-Bus-Tracker/1.0";

const VEHICLE_MONITORING_PATH: &str = "/api/siri/vehicle-monitoring.json";
const STOP_MONITORING_PATH: &str = "/api/siri/stop-monitoring.json";

#[derive(Debug, Error)]
pub enum MtaClientError {
    #[error("{0}")]
    Request(reqwest::Error),
    #[error("invalid JSON in response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    Shape(String),
    #[error("MTA API Error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for MtaClientError {
    // the request URL carries the API key
    fn from(e: reqwest::Error) -> Self {
        MtaClientError::Request(e.without_url())
    }
}

#[derive(Clone, Debug)]
pub struct StopMonitoringQuery {
    pub monitoring_ref: String,
    pub line_ref: String,
    pub direction_ref: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct UpcomingArrival {
    pub vehicle_id: String,
    pub expected_arrival_time: String,
    pub minutes_until_arrival: i64,
}

#[derive(Clone)]
pub struct MtaClient {
    host: String,
    api_key: ApiKey,
    client: reqwest::Client,
}

impl MtaClient {
    pub fn new(host: String, api_key: ApiKey) -> Result<Self, MtaClientError> {
        let request_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(MtaClient {
            host: host.trim_end_matches('/').to_string(),
            api_key,
            client: request_client,
        })
    }

    async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, MtaClientError> {
        let mut url = format!(
            "{}{}?key={}",
            self.host,
            path,
            encode(self.api_key.expose())
        );
        for (name, value) in params {
            url.push_str(&format!("&{}={}", name, encode(value)));
        }

        debug!(path, ?params, "Requesting BusTime");

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(serde_json::from_str(&body)?)
    }

    pub async fn fetch_vehicle_monitoring(&self, line_ref: &str) -> Result<Value, MtaClientError> {
        self.get_json(VEHICLE_MONITORING_PATH, &[("LineRef", line_ref)])
            .await
    }

    pub async fn fetch_stop_monitoring(
        &self,
        query: &StopMonitoringQuery,
    ) -> Result<Value, MtaClientError> {
        self.get_json(
            STOP_MONITORING_PATH,
            &[
                ("MonitoringRef", &query.monitoring_ref),
                ("LineRef", &query.line_ref),
                ("DirectionRef", &query.direction_ref),
            ],
        )
        .await
    }

    pub async fn fetch_upcoming_arrivals(
        &self,
        query: &StopMonitoringQuery,
        limit: usize,
    ) -> Result<Vec<UpcomingArrival>, MtaClientError> {
        let body = self.fetch_stop_monitoring(query).await?;
        let response: GetStopMonitoringResponse =
            serde_json::from_value(body).map_err(|e| MtaClientError::Shape(e.to_string()))?;

        upcoming_arrivals(&response, Utc::now(), limit)
    }
}

pub fn upcoming_arrivals(
    response: &GetStopMonitoringResponse,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<UpcomingArrival>, MtaClientError> {
    let Some(delivery) = response.first_delivery() else {
        return Ok(Vec::new());
    };

    if let Some(ref condition) = delivery.ErrorCondition {
        return Err(MtaClientError::Api(condition.message()));
    }

    Ok(delivery
        .MonitoredStopVisit
        .iter()
        .filter_map(|visit| arrival_for_visit(visit, now))
        .take(limit)
        .collect())
}

fn arrival_for_visit(visit: &MonitoredStopVisit, now: DateTime<Utc>) -> Option<UpcomingArrival> {
    let journey = &visit.MonitoredVehicleJourney;
    let expected_arrival_time = journey
        .MonitoredCall
        .ExpectedDepartureTime
        .clone()
        .or_else(|| journey.MonitoredCall.ExpectedArrivalTime.clone())?;

    let expected = match DateTime::parse_from_rfc3339(&expected_arrival_time) {
        Ok(d) => d,
        Err(e) => {
            debug!("Skipping visit with bad time {}: {}", expected_arrival_time, e);
            return None;
        }
    };

    let delta = expected.signed_duration_since(now);
    let minutes = (delta.num_milliseconds() as f64 / 60_000.0).round() as i64;

    let vehicle_id = journey
        .VehicleRef
        .as_deref()
        .and_then(|r| r.rsplit('_').next())
        .filter(|id| !id.is_empty())
        .unwrap_or("unknown")
        .to_string();

    Some(UpcomingArrival {
        vehicle_id,
        expected_arrival_time,
        minutes_until_arrival: minutes.max(0),
    })
}
