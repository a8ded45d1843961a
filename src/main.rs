use clap::Parser;
use prop_ev::cli::{Cli, Commands};
use prop_ev::config::Config;

const DEFAULT_CONFIG: &str = include_str!("../config.toml.example");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            toml::from_str(DEFAULT_CONFIG)?
        }
    };

    // Initialize telemetry
    let _telemetry = prop_ev::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Analyze(args) => {
            tracing::info!("Starting analysis");
            args.execute(&config).await?;
        }
        Commands::Thresholds(args) => args.execute(&config)?,
        Commands::Fair(args) => args.execute()?,
        Commands::Inspect(args) => args.execute()?,
        Commands::Config => {
            println!("Current configuration:");
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
