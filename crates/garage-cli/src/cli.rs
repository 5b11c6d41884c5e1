//! CLI definition using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use garage_types::OutputFormat;

#[derive(Parser)]
#[command(name = "garage")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Virtual garage: vehicles, maintenance history and reminders")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Store directory override
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Vehicle variant to create
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum VehicleType {
    Base,
    Cargo,
    Performance,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List vehicles in the garage
    List,

    /// Add a vehicle
    Add {
        /// Model name (e.g., "Actros")
        model: String,

        /// Color
        #[arg(default_value = "")]
        color: String,

        /// Vehicle variant
        #[arg(long = "type", short = 't', value_enum, default_value_t = VehicleType::Base)]
        vehicle_type: VehicleType,

        /// Cargo capacity in kg (cargo only)
        #[arg(long)]
        capacity: Option<f64>,

        /// Fixed top speed in km/h (performance only, random if omitted)
        #[arg(long, value_parser = clap::value_parser!(u32).range(280..=360))]
        top_speed: Option<u32>,

        /// Select the vehicle after adding it
        #[arg(long)]
        select: bool,
    },

    /// Remove a vehicle
    Remove {
        /// Vehicle id
        id: String,
    },

    /// Select a vehicle (omit the id to clear the selection)
    Select {
        /// Vehicle id
        id: Option<String>,
    },

    /// Show status and maintenance of a vehicle (selected one by default)
    Show {
        /// Vehicle id
        id: Option<String>,
    },

    /// Drive a vehicle (selected one by default)
    Drive {
        /// Vehicle id
        #[arg(long)]
        vehicle: Option<String>,

        #[command(subcommand)]
        action: DriveAction,
    },

    /// Manage maintenance records (selected vehicle by default)
    Maintenance {
        /// Vehicle id
        #[arg(long)]
        vehicle: Option<String>,

        #[command(subcommand)]
        action: MaintenanceAction,
    },

    /// Show upcoming maintenance reminders
    Remind {
        /// Look-ahead in days. Uses config value if not specified.
        #[arg(long, short = 'd')]
        days: Option<u32>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set store directory
        #[arg(long)]
        set_store_dir: Option<PathBuf>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set default reminder look-ahead in days
        #[arg(long)]
        set_lead_days: Option<u32>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum DriveAction {
    /// Turn the ignition on or off
    Ignition,
    /// Speed up one step
    Accelerate,
    /// Slow down one step
    Brake,
    /// One-shot boost (performance only)
    Boost,
    /// Load cargo in kg (cargo only)
    Load { amount: f64 },
    /// Unload cargo in kg (cargo only)
    Unload { amount: f64 },
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum MaintenanceAction {
    /// Record a service or schedule one
    Add {
        /// Date and time (e.g., "2024-12-25T10:30" or "2024-12-25")
        date: String,

        /// Service kind (e.g., "Troca de óleo")
        kind: String,

        /// Cost in BRL (accepts "150,50")
        #[arg(long, short = 'c')]
        cost: Option<String>,

        /// Optional notes
        #[arg(long, short = 'n')]
        description: Option<String>,
    },

    /// Remove a record by id
    Remove {
        /// Record id
        record_id: String,
    },

    /// List history and scheduled services
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_cargo() {
        let cli = Cli::try_parse_from([
            "garage", "add", "Actros", "Branco", "--type", "cargo", "--capacity", "12000", "-f", "json",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Commands::Add {
                model,
                color,
                vehicle_type,
                capacity,
                ..
            } => {
                assert_eq!(model, "Actros");
                assert_eq!(color, "Branco");
                assert_eq!(vehicle_type, VehicleType::Cargo);
                assert_eq!(capacity, Some(12000.0));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_top_speed_range_enforced() {
        assert!(Cli::try_parse_from(["garage", "add", "F8", "--type", "performance", "--top-speed", "400"]).is_err());
        assert!(Cli::try_parse_from(["garage", "add", "F8", "--type", "performance", "--top-speed", "300"]).is_ok());
    }

    #[test]
    fn test_parse_drive_load() {
        let cli = Cli::try_parse_from(["garage", "drive", "--vehicle", "c1", "load", "500"]).unwrap();
        match cli.command {
            Commands::Drive { vehicle, action } => {
                assert_eq!(vehicle.as_deref(), Some("c1"));
                assert_eq!(action, DriveAction::Load { amount: 500.0 });
            }
            _ => panic!("expected drive"),
        }
    }

    #[test]
    fn test_select_without_id_clears() {
        let cli = Cli::try_parse_from(["garage", "select"]).unwrap();
        assert!(matches!(cli.command, Commands::Select { id: None }));
    }
}
