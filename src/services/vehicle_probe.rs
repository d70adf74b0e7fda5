use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    services::ProbeTarget,
    types::mta_vehicle_monitoring_response::{GetVehicleMonitoringResponse, VehicleActivity},
    utils::{
        credential::{ApiKey, CredentialError},
        json_excerpt::pretty_excerpt,
        mta_client::{MtaClient, MtaClientError},
    },
};

const RESPONSE_EXCERPT_CHARS: usize = 1000;

#[derive(Debug, PartialEq)]
pub struct VehicleSummary {
    pub line_name: String,
    pub destination: String,
    pub origin_ref: String,
    pub location: Value,
}

impl From<&VehicleActivity> for VehicleSummary {
    fn from(activity: &VehicleActivity) -> Self {
        let journey = &activity.MonitoredVehicleJourney;

        VehicleSummary {
            line_name: field_text(&journey.PublishedLineName),
            destination: field_text(&journey.DestinationName),
            origin_ref: field_text(&journey.OriginRef),
            location: journey
                .VehicleLocation
                .clone()
                .unwrap_or_else(|| Value::Object(Default::default())),
        }
    }
}

// strings print bare, anything else as JSON
fn field_text(field: &Option<Value>) -> String {
    match field {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl fmt::Display for VehicleSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Vehicle: {} - {}", self.line_name, self.destination)?;
        writeln!(f, "Origin: {}", self.origin_ref)?;
        writeln!(f, "Location: {}", self.location)?;
        write!(f, "---")
    }
}

#[derive(Debug)]
pub enum VehicleProbeOutcome {
    MissingCredential,
    Failed(MtaClientError),
    Reported(Vec<VehicleSummary>),
}

pub async fn probe_vehicles(
    target: &ProbeTarget,
    api_key: Result<ApiKey, CredentialError>,
) -> VehicleProbeOutcome {
    let api_key = match api_key {
        Ok(key) => key,
        Err(e) => {
            warn!("Skipping vehicle monitoring: {}", e);
            println!("Error: {}", e);
            return VehicleProbeOutcome::MissingCredential;
        }
    };

    match report_vehicles(target, api_key).await {
        Ok(vehicles) => VehicleProbeOutcome::Reported(vehicles),
        Err(e) => {
            println!("Error getting vehicle monitoring: {}", e);
            VehicleProbeOutcome::Failed(e)
        }
    }
}

async fn report_vehicles(
    target: &ProbeTarget,
    api_key: ApiKey,
) -> Result<Vec<VehicleSummary>, MtaClientError> {
    let client = MtaClient::new(target.host.clone(), api_key)?;
    let body = client.fetch_vehicle_monitoring(&target.line_ref).await?;

    println!("{} Vehicle Monitoring Response:", target.line_ref);
    println!("{}", pretty_excerpt(&body, RESPONSE_EXCERPT_CHARS));

    let response: GetVehicleMonitoringResponse =
        serde_json::from_value(body).map_err(|e| MtaClientError::Shape(e.to_string()))?;
    let vehicles: Vec<VehicleSummary> = response
        .vehicle_activities()
        .iter()
        .map(VehicleSummary::from)
        .collect();

    debug!(line_ref = %target.line_ref, count = vehicles.len(), "Vehicles reported");

    for vehicle in &vehicles {
        println!("{}", vehicle);
    }

    Ok(vehicles)
}
