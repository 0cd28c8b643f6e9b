//! device-auth CLI binary entry point.

use clap::Parser;
use device_auth::cli::{Cli, Commands};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login(args) => device_auth::cli::login::handle_login(cli.url, args.state).await,
        Commands::Permissions(args) => {
            device_auth::cli::login::handle_permissions(cli.url, &args.organization_id).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
