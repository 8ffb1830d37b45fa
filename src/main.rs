//! breadcrumbs CLI entry point
//!
//! Parses arguments, runs the selected subcommand and turns failures into a
//! readable message with a suggestion before exiting with status 1.

use anyhow::Result;
use breadcrumbs_cli::cli;
use breadcrumbs_cli::core::error::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
