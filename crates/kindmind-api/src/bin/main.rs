//! KindMind gateway entry point

use clap::Parser;
use kindmind_api::cli::{self, Cli, ExitCode};
use kindmind_api::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing("info")?;

    let code = cli::run(Cli::parse()).await?;
    if code != ExitCode::Success {
        std::process::exit(code.into());
    }

    Ok(())
}
