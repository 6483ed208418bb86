use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use drilldown::{routes, state};
use drilldown_configuration::environment::ProcessEnvironment;
use drilldown_configuration::{make_runtime_configuration, parse_configuration};

/// Serve the resources of a configuration directory over HTTP.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// The directory holding configuration.json.
    #[arg(long, env = "DRILLDOWN_CONFIGURATION", default_value = ".")]
    configuration: PathBuf,
    /// The port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
pub async fn main() -> ExitCode {
    env_logger::init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let parsed = parse_configuration(&args.configuration).await?;
    let configuration = make_runtime_configuration(parsed, ProcessEnvironment)?;
    let state = state::create_state(configuration, prometheus::Registry::new()).await?;

    let address = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!(%address, "listening");
    axum::Server::bind(&address)
        .serve(routes::create_router(state).into_make_service())
        .await?;
    Ok(())
}
