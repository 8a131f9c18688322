mod cli;
mod io_utils;
mod logging;

use std::process::exit;

use clap::Parser;
use tracing::error;

use crate::cli::{Cli, GetVerbosity};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::setup_logger(cli.cmd.get_verbosity().tracing_level_filter()) {
        eprintln!("{}", e);
    }
    if let Err(e) = cli.cmd.run(cli.color).await {
        error!("{}", e);
        exit(1);
    }
}
