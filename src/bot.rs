use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cache::TextsCache;
use crate::config::{OneBotConfig, PortraitConfig};
use crate::handlers::CommandHandler;
use crate::llm::ProviderRegistry;
use crate::onebot::events::listen_group_messages;
use crate::onebot::{GroupMessageEvent, HttpOneBotClient, OneBotApi};

const EVENT_QUEUE_SIZE: usize = 256;

/// shared state handed to every command invocation
#[derive(Clone)]
pub struct BotContext {
    pub api: Arc<dyn OneBotApi>,
    pub providers: Arc<ProviderRegistry>,
    pub config: Arc<PortraitConfig>,
    pub cache: TextsCache,
}

impl BotContext {
    pub fn new(
        api: Arc<dyn OneBotApi>,
        providers: ProviderRegistry,
        config: PortraitConfig,
    ) -> Self {
        Self {
            api,
            providers: Arc::new(providers),
            config: Arc::new(config),
            cache: TextsCache::new(),
        }
    }

    /// spawns the portrait flow when the event is a `画像` command
    pub fn dispatch(&self, event: GroupMessageEvent) -> Option<tokio::task::JoinHandle<()>> {
        let cmd = CommandHandler::parse_command(&event.message_str(), &self.config.wake_prefixes)?;
        let ctx = self.clone();
        Some(tokio::spawn(async move {
            CommandHandler::handle_portrait(ctx, event, cmd).await;
        }))
    }

    /// drops every cached text list
    pub async fn terminate(&self) {
        self.cache.clear().await;
    }
}

pub struct PortraitBot {
    ctx: BotContext,
    onebot: OneBotConfig,
}

impl PortraitBot {
    pub fn new(
        onebot: OneBotConfig,
        config: PortraitConfig,
        providers: ProviderRegistry,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if providers.is_empty() {
            warn!("No LLM provider configured; portrait requests will get an empty response");
        }

        let api = HttpOneBotClient::new(&onebot.http_url, onebot.access_token.clone())?;
        let ctx = BotContext::new(Arc::new(api), providers, config);

        Ok(Self { ctx, onebot })
    }

    pub async fn run(&self) {
        info!("Starting portrait bot...");

        let (tx, mut rx) = mpsc::channel::<GroupMessageEvent>(EVENT_QUEUE_SIZE);
        let ws_url = self.onebot.ws_url.clone();
        let access_token = self.onebot.access_token.clone();
        let listener = tokio::spawn(async move {
            if let Err(e) = listen_group_messages(ws_url, access_token, tx).await {
                error!("OneBot event listener stopped: {}", e);
            }
        });

        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else {
                        warn!("Event stream closed");
                        break;
                    };
                    if self.ctx.dispatch(event).is_some() {
                        info!("Dispatched portrait command");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received ctrl-c, shutting down");
                    break;
                }
            }
        }

        listener.abort();
        self.ctx.terminate().await;
    }
}
