//! tado CLI binary entry point.

use clap::Parser;
use tado_client::cli::{AuthCommands, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = tado_client::cli::auth::load_config(cli.profile.as_deref())?;

    match cli.command {
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::Login(args) => {
                tado_client::cli::auth::handle_login(config, args.force).await
            }
            AuthCommands::Status => tado_client::cli::auth::handle_status(config).await,
            AuthCommands::Logout => tado_client::cli::auth::handle_logout(config).await,
        },
        Commands::Zones => tado_client::cli::home::handle_zones(config).await,
        Commands::Weather => tado_client::cli::home::handle_weather(config).await,
    }
}
