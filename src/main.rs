use clap::{Parser, Subcommand};
use std::path::PathBuf;

use green_city_blueprint::{config, data, server};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the point dataset and the park-simulation API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Load the seed points file and report validity
    Validate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let points = data::load_points(&app_config)?;
            server::start_server(app_config, points).await?;
        }
        Commands::Validate { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let points = data::load_points(&app_config)?;
            let (valid, invalid) = data::validation_report(&points);
            println!(
                "{} points loaded: {} renderable, {} with invalid coordinates",
                points.len(),
                valid,
                invalid
            );
        }
    }

    Ok(())
}
