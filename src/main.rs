//! escape-lens command line

use anyhow::{anyhow, Result};
use clap::Parser;

use escape_lens::cli::CliArgs;
use escape_lens::config::LensConfig;
use escape_lens::runtime;

fn main() -> Result<()> {
    escape_lens::tracing::init();

    let action = CliArgs::parse().into_action().map_err(|e| anyhow!(e))?;
    tracing::debug!(?action, "Starting");

    let config = LensConfig::load();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runtime::run(action, config, &mut out)
}
