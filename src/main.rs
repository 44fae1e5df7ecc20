// Robot Teleop - terminal entry point

use anyhow::Context;
use clap::Parser;
use robot_teleop::cli::Cli;
use robot_teleop::console::{spawn_stdin_reader, Console};
use robot_teleop::logging::init_tracing;
use robot_teleop::storage::ConfigService;
use robot_teleop::run_client;
use tracing::debug;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter.as_deref());

    let mut config = ConfigService::load(cli.config.as_deref()).context("failed to load config")?;
    config
        .apply_overrides(cli.overrides())
        .context("invalid command line settings")?;
    debug!(source = ?config.source(), "configuration loaded");
    let config = config.into_config();

    let input = spawn_stdin_reader().context("failed to start console input")?;
    let summary = run_client(&config, input, Console::stdout())
        .await
        .context("session failed")?;
    debug!(cause = ?summary.cause, "client stopped");
    Ok(())
}
