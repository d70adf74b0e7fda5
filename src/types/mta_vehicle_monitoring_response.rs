#![allow(non_snake_case)]
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitoredVehicleJourney {
    pub PublishedLineName: Option<Value>,
    pub DestinationName: Option<Value>,
    pub OriginRef: Option<Value>,
    pub VehicleLocation: Option<Value>,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct VehicleActivity {
    pub MonitoredVehicleJourney: MonitoredVehicleJourney,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct VehicleMonitoringDelivery {
    pub VehicleActivity: Vec<VehicleActivity>,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceDelivery {
    pub VehicleMonitoringDelivery: Vec<VehicleMonitoringDelivery>,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Siri {
    pub ServiceDelivery: ServiceDelivery,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GetVehicleMonitoringResponse {
    pub Siri: Siri,
}

impl GetVehicleMonitoringResponse {
    // first delivery only
    pub fn vehicle_activities(&self) -> &[VehicleActivity] {
        self.Siri
            .ServiceDelivery
            .VehicleMonitoringDelivery
            .first()
            .map(|d| d.VehicleActivity.as_slice())
            .unwrap_or_default()
    }
}
