//! Nourish CLI entry point.

use anyhow::Result;
use clap::Parser;

use nourish::cli::commands::{seed, serve::{self, ServeArgs}};
use nourish::cli::{Cli, Commands};
use nourish::infrastructure::logging::LoggerImpl;
use nourish::{Config, ConfigLoader};

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => nourish::cli::handle_error(err, cli.json),
    };

    // Held for the life of the process so file logs are flushed on exit.
    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => nourish::cli::handle_error(err, cli.json),
    };

    let result = match cli.command {
        None => serve::execute(ServeArgs::default(), config).await,
        Some(Commands::Serve(args)) => serve::execute(args, config).await,
        Some(Commands::Seed(args)) => seed::execute(args, config, cli.json).await,
    };

    if let Err(err) = result {
        nourish::cli::handle_error(err, cli.json);
    }
}
