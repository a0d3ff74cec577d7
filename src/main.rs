use clap::Parser;
use log::info;
use std::path::PathBuf;

use qq_portrait::bot::PortraitBot;
use qq_portrait::config::{OneBotConfig, PortraitConfig};
use qq_portrait::llm::ProviderRegistry;

#[derive(Parser)]
#[command(name = "qq-portrait")]
#[command(about = "A QQ group bot that draws LLM portraits of group members")]
struct Args {
    /// optional JSON file with portrait settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // load .env file if it exists
    if let Err(e) = dotenvy::dotenv() {
        // only warn if .env file exists but failed to load
        match e {
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {}
            _ => {
                eprintln!("warning: failed to load .env file: {}", e);
            }
        }
    }

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let config = PortraitConfig::load(args.config.as_deref())?;
    let onebot = OneBotConfig::from_env()?;
    let providers = ProviderRegistry::from_env();

    info!("Starting bot...");

    let bot = PortraitBot::new(onebot, config, providers)?;
    bot.run().await;

    Ok(())
}
