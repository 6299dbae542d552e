use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use fleet_core::fixtures::european_capital_factory;
use fleet_core::geo::Point;
use fleet_core::planning::{PlanningService, PlanningSet};
use fleet_core::store::{EntityStore, InMemoryStore};
use fleet_core::{AllocationError, FleetConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "fleet",
    about = "Optimal transport-to-shipment allocation",
    long_about = "Seeds a demo fleet, assigns transports to shipments with minimal total\n\
                  empty distance, and computes single distances with the configured\n\
                  routing provider."
)]
struct Cli {
    /// Configuration file (TOML or JSON); FLEET__* environment variables override it
    #[arg(long, global = true, env = "FLEET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed entities, apply the optimal planning and print it
    Plan {
        /// Maximum empty distance per pairing in km (configuration default when omitted)
        #[arg(long)]
        max_empty_km: Option<f64>,
        /// Tab-separated entity table to import instead of the European capitals
        #[arg(long)]
        entities: Option<PathBuf>,
    },
    /// Compute the distance between two points
    Distance {
        /// Origin as "lat, lon"
        #[arg(long)]
        from: Point,
        /// Destination as "lat, lon"
        #[arg(long)]
        to: Point,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration: {0}")]
    Config(#[from] fleet_core::config::ConfigError),
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

// ── Commands ───────────────────────────────────────────────────────

fn plan(
    service: &PlanningService<InMemoryStore>,
    max_empty_km: Option<f64>,
    entities: Option<&Path>,
) -> Result<(), CliError> {
    match entities {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            service.import_entities(file)?;
        }
        None => {
            european_capital_factory(service.store().as_ref())?;
        }
    }

    let committed = service.apply_optimal_planning(max_empty_km)?;
    for planning in &committed {
        service.request_route(planning.id)?;
    }

    let set = service.get_planning_set()?;
    print_planning_set(service.store().as_ref(), &set)?;
    Ok(())
}

fn print_planning_set(store: &InMemoryStore, set: &PlanningSet) -> Result<(), CliError> {
    println!("{:<16} {:<16} {:>10}", "transport", "shipment", "empty km");
    for planning in &set.plannings {
        let transport = store
            .transport(planning.transport)
            .map_err(AllocationError::from)?
            .ok_or(AllocationError::TransportNotFound(planning.transport))?;
        let shipment = store
            .shipment(planning.shipment)
            .map_err(AllocationError::from)?
            .ok_or(AllocationError::ShipmentNotFound(planning.shipment))?;
        let distance = set
            .routes
            .iter()
            .find(|route| Some(route.id) == planning.route)
            .map_or_else(|| "-".to_string(), |route| format!("{:.0}", route.distance_km));
        println!("{:<16} {:<16} {:>10}", transport.name, shipment.name, distance);
    }
    println!();
    println!("plannings:            {}", set.plannings.len());
    println!("unplanned transports: {}", set.unplanned_transports.len());
    println!("unplanned shipments:  {}", set.unplanned_shipments.len());
    println!("total empty km:       {:.0}", set.total_empty_km);
    Ok(())
}

fn distance(service: &PlanningService<InMemoryStore>, from: Point, to: Point) -> Result<(), CliError> {
    let route = service.resolver().fetch_route(from, to)?;
    println!(
        "{from} -> {to}: {:.0} km ({})",
        route.distance_km,
        service.resolver().provider_name()
    );
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = FleetConfig::load(cli.config.as_deref())?;
    let service = PlanningService::new(Arc::new(InMemoryStore::new()), &config)?;
    tracing::info!(
        provider = service.resolver().provider_name(),
        max_empty_km = config.max_empty_km,
        "configuration loaded"
    );

    match cli.command {
        Commands::Plan {
            max_empty_km,
            entities,
        } => plan(&service, max_empty_km, entities.as_deref()),
        Commands::Distance { from, to } => distance(&service, from, to),
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        exit(1);
    }
}
