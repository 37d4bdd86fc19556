mod commands;
mod config;
mod main_lib;

use clap::Parser;
use commands::Cli;
use config::Config;
use main_lib::{build_manager, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine; variables may come from the shell.
    let _ = dotenvy::dotenv();
    let mut config = Config::from_env()?;
    if let Some(path) = cli.portfolio {
        config.portfolio_path = path;
    }
    init_tracing(config.log_format);

    let mut manager = build_manager(&config)?;
    commands::run(&mut manager, cli.command).await
}
