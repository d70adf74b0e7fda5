#![allow(non_snake_case)]
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitoredCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ExpectedArrivalTime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ExpectedDepartureTime: Option<String>,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitoredVehicleJourney {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub VehicleRef: Option<String>,
    pub MonitoredCall: MonitoredCall,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitoredStopVisit {
    pub MonitoredVehicleJourney: MonitoredVehicleJourney,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OtherError {
    pub ErrorText: Option<String>,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ErrorCondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub Description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub OtherError: Option<OtherError>,
}

impl ErrorCondition {
    pub fn message(&self) -> String {
        self.Description
            .clone()
            .or_else(|| self.OtherError.as_ref().and_then(|e| e.ErrorText.clone()))
            .unwrap_or_else(|| "Unknown API Error".to_string())
    }
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StopMonitoringDelivery {
    pub MonitoredStopVisit: Vec<MonitoredStopVisit>,
    // key presence matters, so never serialize a null
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ErrorCondition: Option<ErrorCondition>,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceDelivery {
    pub StopMonitoringDelivery: Vec<StopMonitoringDelivery>,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Siri {
    pub ServiceDelivery: ServiceDelivery,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GetStopMonitoringResponse {
    pub Siri: Siri,
}

impl GetStopMonitoringResponse {
    pub fn first_delivery(&self) -> Option<&StopMonitoringDelivery> {
        self.Siri.ServiceDelivery.StopMonitoringDelivery.first()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_condition_message_fallbacks() {
        let described: ErrorCondition =
            serde_json::from_value(json!({ "Description": "No such stop: 401041" })).unwrap();
        assert_eq!(described.message(), "No such stop: 401041");

        let other: ErrorCondition =
            serde_json::from_value(json!({ "OtherError": { "ErrorText": "Key is invalid" } }))
                .unwrap();
        assert_eq!(other.message(), "Key is invalid");

        assert_eq!(ErrorCondition::default().message(), "Unknown API Error");
    }

    #[test]
    fn tolerates_missing_sections() {
        let response: GetStopMonitoringResponse =
            serde_json::from_value(json!({ "Siri": {} })).unwrap();
        assert!(response.first_delivery().is_none());
    }
}
