use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use qq_portrait::config::{OneBotConfig, PortraitConfig};
use qq_portrait::history::HistoryFetcher;
use qq_portrait::llm::ProviderRegistry;
use qq_portrait::onebot::types::Gender;
use qq_portrait::onebot::{HttpOneBotClient, OneBotApi};
use qq_portrait::portrait::PortraitGenerator;

#[derive(Parser, Debug)]
#[command(name = "portrait_prompt")]
#[command(about = "Print a portrait of a group member without running the bot")]
struct Args {
    /// group to read history from
    #[arg(value_name = "GROUP_ID")]
    group_id: i64,

    /// member to portray
    #[arg(value_name = "USER_ID")]
    user_id: i64,

    /// history rounds to fetch (200 messages each)
    #[arg(long)]
    rounds: Option<u32>,

    /// optional JSON file with portrait settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // load environment variables before logging so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    // initialize logging
    env_logger::init();

    let args = Args::parse();

    let config = PortraitConfig::load(args.config.as_deref())?;
    let onebot = OneBotConfig::from_env()?;
    let providers = ProviderRegistry::from_env();
    let api = HttpOneBotClient::new(&onebot.http_url, onebot.access_token.clone())?;

    let (nickname, gender) = match api.get_group_member_info(args.group_id, args.user_id).await {
        Ok(member) => (
            member
                .display_name()
                .map(|n| n.to_string())
                .unwrap_or_else(|| args.user_id.to_string()),
            member.gender(),
        ),
        Err(e) => {
            error!("Member lookup failed: {}", e);
            (args.user_id.to_string(), Gender::Unknown)
        }
    };

    let rounds = args
        .rounds
        .unwrap_or(config.max_query_rounds)
        .min(qq_portrait::history::MAX_ROUNDS);
    info!("Fetching {} rounds of history for {}", rounds, nickname);

    let fetcher = HistoryFetcher::new(&api, config.max_msg_count);
    let result = fetcher
        .fetch_user_texts(args.group_id, &args.user_id.to_string(), rounds)
        .await?;

    if result.texts.is_empty() {
        error!("No messages found for {} in group {}", args.user_id, args.group_id);
        std::process::exit(1);
    }

    let generator = PortraitGenerator::new(&providers, &config);
    match generator.generate(&nickname, gender, &result.texts).await {
        Some(portrait) => println!("{}", portrait),
        None => {
            error!("LLM returned no portrait");
            std::process::exit(1);
        }
    }

    Ok(())
}
