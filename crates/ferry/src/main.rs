mod cli;
mod error;

use std::time::Duration;

use clap::Parser;
use ferry_relay::{RelayConfig, Server};

use cli::Cli;
use error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    if let Err(e) = serve(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn serve(cli: Cli) -> Result<(), CliError> {
    let config = RelayConfig {
        bind_host: cli.bind,
        bind_port: cli.port,
        idle_timeout: Duration::from_secs(u64::from(cli.timeout)),
    };

    let server = Server::bind(config).await?;
    server.run().await?;
    Ok(())
}

fn setup_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = std::env::var("FERRY_LOG").unwrap_or_else(|_| level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}
