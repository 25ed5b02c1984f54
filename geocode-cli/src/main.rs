use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;

/// Address geocoding and great-circle distance CLI tool
#[derive(Parser)]
#[command(name = "geocode")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    provider: ProviderArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options selecting and configuring the geocoding provider.
#[derive(Args, Debug, Clone)]
pub struct ProviderArgs {
    /// TOML file with named configuration groups
    #[arg(short, long, env = "GEOCODE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Configuration group to use
    #[arg(short, long, default_value = geocode::DEFAULT_GROUP, global = true)]
    pub group: String,

    /// Override the group's service (Google or Yahoo)
    #[arg(short, long, global = true)]
    pub service: Option<String>,

    /// Override the group's API key
    #[arg(short = 'k', long, env = "GEOCODE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Earth radius used for distances (miles by default)
    #[arg(short, long, global = true)]
    pub radius: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode a single address
    Lookup {
        /// Free-text address
        address: String,

        /// Output the result as JSON
        #[arg(short, long, conflicts_with = "geojson")]
        json: bool,

        /// Output the placemarks as a GeoJSON FeatureCollection
        #[arg(long)]
        geojson: bool,
    },

    /// Great-circle distance between two coordinates
    Distance {
        /// Start point as LAT,LON
        #[arg(long, value_parser = commands::distance::parse_point, allow_hyphen_values = true)]
        from: (f64, f64),

        /// End point as LAT,LON
        #[arg(long, value_parser = commands::distance::parse_point, allow_hyphen_values = true)]
        to: (f64, f64),

        /// Formula to use
        #[arg(short, long, value_enum, default_value_t = Formula::Haversine)]
        formula: Formula,

        /// Report kilometers instead of miles
        #[arg(long)]
        km: bool,
    },

    /// Show the resolved configuration
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Formula {
    Haversine,
    Cosines,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geocode=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup {
            address,
            json,
            geojson,
        } => commands::lookup::run(&cli.provider, &address, json, geojson),
        Commands::Distance {
            from,
            to,
            formula,
            km,
        } => commands::distance::run(cli.provider.radius, from, to, formula, km),
        Commands::Config => commands::config::run(&cli.provider),
    }
}
