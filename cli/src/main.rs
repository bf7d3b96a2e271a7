//! Fleet dispatch command line
//!
//! Operates on a JSON fleet file (drivers, routes, orders, simulations).
//! Every command loads the file, runs one operation and, if the store
//! changed, writes the file back with a fresh checksum. A failed apply still
//! saves whatever it wrote before failing.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use fleet_dispatch_core::{
    FatigueLevel, FleetService, MemoryStore, OrderStatus, SimulationParams, SimulationRequest,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fleet-dispatch")]
#[command(about = "Plan and track delivery dispatch for a driver fleet")]
struct Args {
    /// Fleet data file
    #[arg(long, default_value = "fleet.json")]
    data: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a dispatch simulation over pending orders
    Simulate {
        /// How many available drivers to consider
        #[arg(long)]
        drivers: f64,

        /// Route start time, HH:MM
        #[arg(long)]
        start: String,

        /// Per-driver hour budget (1-12)
        #[arg(long)]
        max_hours: f64,

        /// Dispatch date, YYYY-MM-DD (defaults to the earliest pending order's date)
        #[arg(long)]
        date: Option<String>,
    },

    /// Commit a simulation's assignments to drivers and orders
    Apply { simulation_id: String },

    /// List stored simulations, newest first
    Simulations,

    /// Assign an order to a driver by hand
    Assign { order_id: String, driver_id: String },

    /// Move an order to a new status (assigned needs `assign`)
    Status { order_id: String, status: String },

    /// End a driver's shift
    EndShift { driver_id: String },

    /// Start a new day for one driver, or the whole fleet if none is given
    StartDay { driver_id: Option<String> },

    /// Set a driver's fatigue tier (normal, moderate, high)
    Fatigue { driver_id: String, level: String },

    /// Order counts and delivered financials
    Stats,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let store = load_store(&args.data)?;
    let before = store.to_json()?;
    let mut service = FleetService::new(store);
    let now = Local::now().naive_local();

    let result = run_command(&mut service, args.command, now);

    let after = service.store().to_json()?;
    if after != before {
        std::fs::write(&args.data, after)
            .with_context(|| format!("failed to write fleet file {}", args.data.display()))?;
        tracing::debug!(path = %args.data.display(), "fleet file saved");
    }
    result
}

fn run_command(service: &mut FleetService, command: Command, now: NaiveDateTime) -> Result<()> {
    match command {
        Command::Simulate { drivers, start, max_hours, date } => {
            let params = SimulationParams::try_from(SimulationRequest {
                available_drivers: Some(drivers),
                route_start_time: Some(start),
                max_hours_per_driver: Some(max_hours),
                dispatch_date: date,
            })?;
            let record = service.run_simulation_at(&params, now)?;
            print_json(&record)
        }
        Command::Apply { simulation_id } => match service.apply_simulation(&simulation_id) {
            Ok(report) => print_json(&report),
            Err(err) => {
                tracing::error!(%simulation_id, error = %err, "apply failed");
                Err(err.into())
            }
        },
        Command::Simulations => print_json(&service.list_simulations()?),
        Command::Assign { order_id, driver_id } => {
            service.assign_driver(&order_id, &driver_id, now)?;
            tracing::info!(%order_id, %driver_id, "assigned");
            Ok(())
        }
        Command::Status { order_id, status } => {
            let status: OrderStatus = status.parse().map_err(anyhow::Error::msg)?;
            let order = service.update_order_status(&order_id, status, now)?;
            print_json(&order)
        }
        Command::EndShift { driver_id } => {
            let hours = service.end_shift(&driver_id)?;
            println!("{} ended shift after {:.2} hours", driver_id, hours);
            Ok(())
        }
        Command::StartDay { driver_id: Some(driver_id) } => print_json(&service.start_day(&driver_id)?),
        Command::StartDay { driver_id: None } => print_json(&service.start_day_all()?),
        Command::Fatigue { driver_id, level } => {
            let level: FatigueLevel = level.parse().map_err(anyhow::Error::msg)?;
            service.set_fatigue_level(&driver_id, level)?;
            Ok(())
        }
        Command::Stats => print_json(&service.order_stats()?),
    }
}

fn load_store(path: &Path) -> Result<MemoryStore> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fleet file {}", path.display()))?;
    let store = MemoryStore::from_json(&json)
        .with_context(|| format!("failed to load fleet file {}", path.display()))?;
    tracing::debug!(
        drivers = store.num_drivers(),
        orders = store.num_orders(),
        "fleet file loaded"
    );
    Ok(store)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "fleet_dispatch_core=debug,fleet_dispatch=debug,info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
