use anyhow::Result;
use clap::Parser;
use log::{debug, info};

use form_rules::cli::{Cli, Commands};
use form_rules::commands::{
    CommandContext, calc_command, check_command, state_command, validate_command,
};
use form_rules::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("form-rules.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting form-rules");

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    debug!("Engine config: {:?}", config.engine);

    let ctx = CommandContext::new(config, cli.metadata_dir);

    match cli.command {
        Commands::State(cmd) => state_command(&ctx, cmd).await,
        Commands::Calc(cmd) => calc_command(&ctx, cmd).await,
        Commands::Validate(cmd) => validate_command(&ctx, cmd).await,
        Commands::Check(cmd) => check_command(&ctx, cmd).await,
    }
}
