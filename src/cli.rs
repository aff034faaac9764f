//! CLI argument parsing for the hos-log-worker binary.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hos-log-worker", about = "Hours-of-Service trip log worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the worker server (default if no subcommand given)
    Serve,
    /// Print the duty schedule for known leg distances and exit
    Plan {
        /// Road distance from start to pickup, in meters
        #[arg(long)]
        to_pickup_meters: f64,
        /// Road distance from pickup to dropoff, in meters
        #[arg(long)]
        to_dropoff_meters: f64,
        /// Hours already used in the current cycle
        #[arg(long, default_value_t = 0.0)]
        cycle_used: f64,
    },
}
