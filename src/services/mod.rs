use crate::utils::credential::{ApiKey, CredentialError};

pub mod stop_format_prober;
pub mod vehicle_probe;

use stop_format_prober::{probe_stop_formats, CANDIDATE_STOP_IDS};
use vehicle_probe::probe_vehicles;

#[derive(Clone, Debug)]
pub struct ProbeTarget {
    pub host: String,
    pub line_ref: String,
    pub direction_ref: String,
}

pub fn discovery_summary(found: Option<&str>) -> String {
    match found {
        Some(stop_id) => format!("🎉 Found correct stop ID: {}", stop_id),
        None => "❌ Could not find correct stop ID".to_string(),
    }
}

// each routine loads the key itself
pub async fn run_discovery<F>(target: &ProbeTarget, load_key: F) -> Option<String>
where
    F: Fn() -> Result<ApiKey, CredentialError>,
{
    println!("Finding {} stops...", target.line_ref);
    probe_vehicles(target, load_key()).await;

    println!("\n{}", "=".repeat(50));
    println!("Testing different stop ID formats...");
    let outcome = probe_stop_formats(target, &CANDIDATE_STOP_IDS, load_key()).await;
    let found = outcome.found().map(str::to_string);

    println!("\n{}", discovery_summary(found.as_deref()));

    found
}
