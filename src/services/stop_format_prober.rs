use std::fmt;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    services::ProbeTarget,
    types::mta_stop_monitoring_response::ErrorCondition,
    utils::{
        credential::{ApiKey, CredentialError},
        json_excerpt::pretty_excerpt,
        mta_client::{MtaClient, MtaClientError, StopMonitoringQuery},
    },
};

/// Stop identifier formats tried, in order, for the 41 St & 8 Av stop.
pub const CANDIDATE_STOP_IDS: [&str; 9] = [
    "401041",
    "MTA NYCT_401041",
    "MTA_401041",
    "MTABC_401041",
    "401041_401041",
    "MTA NYCT_401041_401041",
    "405374",
    "MTA_405374",
    "404052",
];

const SUCCESS_EXCERPT_CHARS: usize = 500;
const UNEXPECTED_EXCERPT_CHARS: usize = 200;

#[derive(Debug)]
pub enum CandidateOutcome {
    Success { excerpt: String },
    ErrorCondition(String),
    MissingDelivery,
    UnexpectedFormat { excerpt: String },
    Failed(MtaClientError),
}

impl CandidateOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CandidateOutcome::Success { .. })
    }
}

#[derive(Debug)]
pub struct CandidateAttempt {
    pub stop_id: String,
    pub outcome: CandidateOutcome,
}

impl fmt::Display for CandidateAttempt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let id = &self.stop_id;
        match &self.outcome {
            CandidateOutcome::Success { excerpt } => {
                write!(f, "✅ SUCCESS with {}\nResponse: {}", id, excerpt)
            }
            CandidateOutcome::ErrorCondition(message) => {
                write!(f, "❌ Error with {}: {}", id, message)
            }
            CandidateOutcome::MissingDelivery => {
                write!(f, "❌ No StopMonitoringDelivery with {}", id)
            }
            CandidateOutcome::UnexpectedFormat { excerpt } => write!(
                f,
                "❌ Unexpected response format with {}\nResponse: {}",
                id, excerpt
            ),
            CandidateOutcome::Failed(e) => write!(f, "❌ Error with {}: {}", id, e),
        }
    }
}

#[derive(Debug)]
pub enum StopFormatOutcome {
    MissingCredential,
    ClientUnavailable(MtaClientError),
    Probed { attempts: Vec<CandidateAttempt> },
}

impl StopFormatOutcome {
    pub fn found(&self) -> Option<&str> {
        match self {
            StopFormatOutcome::Probed { attempts } => attempts
                .iter()
                .find(|a| a.outcome.is_success())
                .map(|a| a.stop_id.as_str()),
            _ => None,
        }
    }
}

// key presence decides, not the value
pub fn classify(body: &Value) -> CandidateOutcome {
    let Some(service_delivery) = body.get("Siri").and_then(|s| s.get("ServiceDelivery")) else {
        return CandidateOutcome::UnexpectedFormat {
            excerpt: pretty_excerpt(body, UNEXPECTED_EXCERPT_CHARS),
        };
    };

    let Some(deliveries) = service_delivery.get("StopMonitoringDelivery") else {
        return CandidateOutcome::MissingDelivery;
    };

    let Some(delivery) = deliveries.get(0) else {
        return CandidateOutcome::Failed(MtaClientError::Shape(
            "StopMonitoringDelivery has no entries".to_string(),
        ));
    };

    match delivery.get("ErrorCondition") {
        Some(condition) => CandidateOutcome::ErrorCondition(condition_text(condition)),
        None => CandidateOutcome::Success {
            excerpt: pretty_excerpt(body, SUCCESS_EXCERPT_CHARS),
        },
    }
}

// the raw payload follows the message when it carries more than one field
fn condition_text(condition: &Value) -> String {
    let Ok(parsed) = serde_json::from_value::<ErrorCondition>(condition.clone()) else {
        return condition.to_string();
    };

    match condition.as_object() {
        Some(fields) if fields.len() > 1 => format!("{} {}", parsed.message(), condition),
        _ => parsed.message(),
    }
}

pub async fn probe_stop_formats(
    target: &ProbeTarget,
    candidates: &[&str],
    api_key: Result<ApiKey, CredentialError>,
) -> StopFormatOutcome {
    let api_key = match api_key {
        Ok(key) => key,
        Err(e) => {
            warn!("Skipping stop format probe: {}", e);
            println!("Error: {}", e);
            return StopFormatOutcome::MissingCredential;
        }
    };

    let client = match MtaClient::new(target.host.clone(), api_key) {
        Ok(client) => client,
        Err(e) => {
            println!("Error: {}", e);
            return StopFormatOutcome::ClientUnavailable(e);
        }
    };

    let mut attempts = Vec::new();

    for stop_id in candidates {
        println!("\nTesting stop ID: {}", stop_id);

        let query = StopMonitoringQuery {
            monitoring_ref: stop_id.to_string(),
            line_ref: target.line_ref.clone(),
            direction_ref: target.direction_ref.clone(),
        };

        let outcome = match client.fetch_stop_monitoring(&query).await {
            Ok(body) => classify(&body),
            Err(e) => CandidateOutcome::Failed(e),
        };

        let attempt = CandidateAttempt {
            stop_id: stop_id.to_string(),
            outcome,
        };
        println!("{}", attempt);

        let succeeded = attempt.outcome.is_success();
        attempts.push(attempt);

        if succeeded {
            info!(stop_id, "Stop identifier accepted");
            break;
        }
        debug!(stop_id, "Stop identifier rejected");
    }

    StopFormatOutcome::Probed { attempts }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Mock, ServerGuard};
    use serde_json::json;

    use crate::utils::credential::API_KEY_VAR;

    use super::*;

    fn target(host: String) -> ProbeTarget {
        ProbeTarget {
            host,
            line_ref: "M104".to_string(),
            direction_ref: "N".to_string(),
        }
    }

    fn rejected_body() -> String {
        json!({
            "Siri": { "ServiceDelivery": { "StopMonitoringDelivery": [{
                "ErrorCondition": { "Description": "No such stop" }
            }]}}
        })
        .to_string()
    }

    fn accepted_body() -> String {
        json!({
            "Siri": { "ServiceDelivery": { "StopMonitoringDelivery": [{
                "MonitoredStopVisit": []
            }]}}
        })
        .to_string()
    }

    async fn mock_candidate(server: &mut ServerGuard, stop_id: &str, body: String) -> Mock {
        server
            .mock("GET", "/api/siri/stop-monitoring.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("MonitoringRef".into(), stop_id.into()),
                Matcher::UrlEncoded("LineRef".into(), "M104".into()),
                Matcher::UrlEncoded("DirectionRef".into(), "N".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    #[test]
    fn classifies_error_condition() {
        let body: Value = serde_json::from_str(&rejected_body()).unwrap();
        match classify(&body) {
            CandidateOutcome::ErrorCondition(message) => assert_eq!(message, "No such stop"),
            other => panic!("Unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn error_condition_keeps_extra_fields() {
        let body = json!({
            "Siri": { "ServiceDelivery": { "StopMonitoringDelivery": [{
                "ErrorCondition": {
                    "Description": "No such stop",
                    "OtherError": { "ErrorText": "MonitoringRef 401041 unknown" }
                }
            }]}}
        });

        let attempt = CandidateAttempt {
            stop_id: "401041".to_string(),
            outcome: classify(&body),
        };

        assert_eq!(
            attempt.to_string(),
            r#"❌ Error with 401041: No such stop {"Description":"No such stop","OtherError":{"ErrorText":"MonitoringRef 401041 unknown"}}"#
        );
    }

    #[test]
    fn classifies_null_error_condition_as_error() {
        let body = json!({
            "Siri": { "ServiceDelivery": { "StopMonitoringDelivery": [{ "ErrorCondition": null }]}}
        });
        assert!(matches!(
            classify(&body),
            CandidateOutcome::ErrorCondition(_)
        ));
    }

    #[test]
    fn classifies_missing_delivery_and_bad_shape() {
        let no_delivery = json!({ "Siri": { "ServiceDelivery": { "ResponseTimestamp": "x" } } });
        assert!(matches!(
            classify(&no_delivery),
            CandidateOutcome::MissingDelivery
        ));

        let no_siri = json!({ "error": "bad key" });
        match classify(&no_siri) {
            CandidateOutcome::UnexpectedFormat { excerpt } => {
                assert_eq!(excerpt, "{\n  \"error\": \"bad key\"\n}")
            }
            other => panic!("Unexpected outcome: {:?}", other),
        }

        let empty = json!({ "Siri": { "ServiceDelivery": { "StopMonitoringDelivery": [] } } });
        assert!(matches!(classify(&empty), CandidateOutcome::Failed(_)));
    }

    #[test]
    fn success_excerpt_is_truncated() {
        let visits: Vec<Value> = (0..50)
            .map(|i| json!({ "MonitoredVehicleJourney": { "VehicleRef": format!("MTA NYCT_{}", i) } }))
            .collect();
        let body = json!({
            "Siri": { "ServiceDelivery": { "StopMonitoringDelivery": [{ "MonitoredStopVisit": visits }]}}
        });

        match classify(&body) {
            CandidateOutcome::Success { excerpt } => assert_eq!(excerpt.chars().count(), 500),
            other => panic!("Unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_credential_skips_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let outcome = probe_stop_formats(
            &target(server.url()),
            &CANDIDATE_STOP_IDS,
            Err(CredentialError::Missing(API_KEY_VAR)),
        )
        .await;

        assert!(matches!(outcome, StopFormatOutcome::MissingCredential));
        assert_eq!(outcome.found(), None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn stops_at_first_accepted_candidate() {
        let mut server = mockito::Server::new_async().await;

        let first = mock_candidate(&mut server, "401041", rejected_body()).await;
        let second = mock_candidate(&mut server, "MTA NYCT_401041", rejected_body()).await;
        let third = mock_candidate(&mut server, "MTA_401041", accepted_body()).await;
        let later = server
            .mock("GET", "/api/siri/stop-monitoring.json")
            .match_query(Matcher::UrlEncoded("MonitoringRef".into(), "404052".into()))
            .with_body(accepted_body())
            .expect(0)
            .create_async()
            .await;

        let outcome =
            probe_stop_formats(&target(server.url()), &CANDIDATE_STOP_IDS, Ok(ApiKey::new("k")))
                .await;

        first.assert_async().await;
        second.assert_async().await;
        third.assert_async().await;
        later.assert_async().await;

        assert_eq!(outcome.found(), Some("MTA_401041"));
        let StopFormatOutcome::Probed { attempts } = outcome else {
            panic!("Expected candidates to be probed");
        };
        assert_eq!(attempts.len(), 3);
        assert_eq!(
            attempts[0].to_string(),
            "❌ Error with 401041: No such stop"
        );
    }

    #[tokio::test]
    async fn exhausts_candidates_without_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/siri/stop-monitoring.json")
            .match_query(Matcher::Any)
            .with_body(rejected_body())
            .expect(CANDIDATE_STOP_IDS.len())
            .create_async()
            .await;

        let outcome =
            probe_stop_formats(&target(server.url()), &CANDIDATE_STOP_IDS, Ok(ApiKey::new("k")))
                .await;

        mock.assert_async().await;
        assert_eq!(outcome.found(), None);
        let StopFormatOutcome::Probed { attempts } = outcome else {
            panic!("Expected candidates to be probed");
        };
        assert_eq!(attempts.len(), 9);
        assert!(attempts
            .iter()
            .all(|a| matches!(a.outcome, CandidateOutcome::ErrorCondition(_))));
    }

    #[tokio::test]
    async fn request_failures_continue_to_next_candidate() {
        let mut server = mockito::Server::new_async().await;
        let _unavailable = server
            .mock("GET", "/api/siri/stop-monitoring.json")
            .match_query(Matcher::UrlEncoded("MonitoringRef".into(), "401041".into()))
            .with_status(500)
            .create_async()
            .await;
        let _garbled = mock_candidate(&mut server, "MTA NYCT_401041", "not json".to_string()).await;
        let _accepted = mock_candidate(&mut server, "MTA_401041", accepted_body()).await;

        let outcome =
            probe_stop_formats(&target(server.url()), &CANDIDATE_STOP_IDS, Ok(ApiKey::new("k")))
                .await;

        assert_eq!(outcome.found(), Some("MTA_401041"));
        let StopFormatOutcome::Probed { attempts } = outcome else {
            panic!("Expected candidates to be probed");
        };
        assert!(matches!(
            attempts[0].outcome,
            CandidateOutcome::Failed(MtaClientError::Request(_))
        ));
        assert!(matches!(
            attempts[1].outcome,
            CandidateOutcome::Failed(MtaClientError::Json(_))
        ));
    }
}
