//! Policy impact CLI binary.

use anyhow::Result;
use policy_impact::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the policy-impact CLI.
///
/// Commands run one after another against local files, so a
/// current-thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=policy_impact=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("policy_impact=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting policy-impact CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("policy-impact CLI completed successfully");
    Ok(())
}
