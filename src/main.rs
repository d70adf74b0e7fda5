mod app;
mod routes;
mod services;
mod types;
mod utils;

use anyhow::{Context, Result};
use app::{gen_app, AppConfig};
use clap::{Args, Parser, Subcommand};
use services::{run_discovery, vehicle_probe::probe_vehicles, ProbeTarget};
use tracing::info;
use utils::{
    credential::ApiKey,
    mta_client::{MtaClient, StopMonitoringQuery, DEFAULT_MTA_HOST},
};

#[derive(Parser)]
#[command(author, version, about = "Find the BusTime stop identifier for the M104 at 41 St")]
struct Cli {
    /// BusTime API root
    #[arg(long, env = "MTA_HOST", default_value = DEFAULT_MTA_HOST, global = true)]
    host: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe live vehicles, then try each stop identifier format (default)
    Find(LineArgs),
    /// Print live vehicle positions for a line
    Vehicles(LineArgs),
    /// Print the next buses at a stop
    Arrivals(ArrivalsArgs),
    /// Serve a health check and a BusTime proxy that keeps the key server-side
    Serve(ServeArgs),
}

#[derive(Args)]
struct LineArgs {
    #[arg(long, default_value = "M104")]
    line_ref: String,
    #[arg(long, default_value = "N")]
    direction_ref: String,
}

impl Default for LineArgs {
    fn default() -> Self {
        LineArgs {
            line_ref: "M104".to_string(),
            direction_ref: "N".to_string(),
        }
    }
}

impl LineArgs {
    fn target(self, host: &str) -> ProbeTarget {
        ProbeTarget {
            host: host.to_string(),
            line_ref: self.line_ref,
            direction_ref: self.direction_ref,
        }
    }
}

#[derive(Args)]
struct StopArgs {
    #[arg(long, env = "STOP_ID", default_value = "401041")]
    stop_id: String,
    #[arg(long, env = "ROUTE_ID", default_value = "M104")]
    route_id: String,
    #[arg(long, env = "DIRECTION", default_value = "N")]
    direction: String,
}

impl StopArgs {
    fn query(self) -> StopMonitoringQuery {
        StopMonitoringQuery {
            monitoring_ref: self.stop_id,
            line_ref: self.route_id,
            direction_ref: self.direction,
        }
    }
}

#[derive(Args)]
struct ArrivalsArgs {
    #[command(flatten)]
    stop: StopArgs,
    #[arg(long, default_value_t = 3)]
    limit: usize,
}

#[derive(Args)]
struct ServeArgs {
    #[command(flatten)]
    stop: StopArgs,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli
        .command
        .unwrap_or_else(|| Commands::Find(LineArgs::default()))
    {
        Commands::Find(args) => {
            run_discovery(&args.target(&cli.host), ApiKey::from_env).await;
        }
        Commands::Vehicles(args) => {
            probe_vehicles(&args.target(&cli.host), ApiKey::from_env()).await;
        }
        Commands::Arrivals(args) => print_arrivals(&cli.host, args).await?,
        Commands::Serve(args) => serve(cli.host, args).await?,
    }

    Ok(())
}

async fn print_arrivals(host: &str, args: ArrivalsArgs) -> Result<()> {
    let client = MtaClient::new(host.to_string(), ApiKey::from_env()?)?;
    let query = args.stop.query();

    let arrivals = client
        .fetch_upcoming_arrivals(&query, args.limit)
        .await
        .with_context(|| format!("Failed to fetch arrivals for {}", query.monitoring_ref))?;

    if arrivals.is_empty() {
        println!("No upcoming buses found for this stop.");
    }
    for arrival in arrivals {
        println!(
            "Bus {} at {} ({} min)",
            arrival.vehicle_id, arrival.expected_arrival_time, arrival.minutes_until_arrival
        );
    }

    Ok(())
}

async fn serve(host: String, args: ServeArgs) -> Result<()> {
    let app = gen_app(AppConfig {
        mta_host: host,
        mta_key: ApiKey::from_env()?,
        stop: args.stop.query(),
    })?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("Failed to bind port {}", args.port))?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
