use log::{error, info, warn};
use std::error::Error;

use crate::bot::BotContext;
use crate::history::{HistoryFetcher, MAX_ROUNDS};
use crate::onebot::types::Gender;
use crate::onebot::{GroupMessageEvent, OneBotError};
use crate::portrait::PortraitGenerator;
use crate::utils::MessageFormatter;

pub const COMMAND_NAME: &str = "画像";

/// a recognised `画像` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortraitCommand {
    /// round count given as the trailing argument, if any
    pub requested_rounds: Option<u64>,
}

impl PortraitCommand {
    /// requested rounds (or the configured default) clamped to the round ceiling
    pub fn query_rounds(&self, default_rounds: u32) -> u32 {
        let rounds = self.requested_rounds.unwrap_or(default_rounds as u64);
        rounds.min(MAX_ROUNDS as u64) as u32
    }
}

pub struct CommandHandler;

impl CommandHandler {
    /// matches `<prefix>画像 [...] [rounds]` against the event's plain text
    pub fn parse_command(text: &str, wake_prefixes: &[String]) -> Option<PortraitCommand> {
        let text = text.trim();

        let matched = wake_prefixes.iter().any(|prefix| {
            text.strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(COMMAND_NAME))
                .map(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
                .unwrap_or(false)
        });
        if !matched {
            return None;
        }

        let requested_rounds = text
            .split_whitespace()
            .last()
            .filter(|token| token.chars().all(|c| c.is_ascii_digit()))
            // an all-digit token too large for u64 still asks for the maximum
            .map(|token| token.parse::<u64>().unwrap_or(u64::MAX));

        Some(PortraitCommand { requested_rounds })
    }

    /// runs the portrait flow; every failure ends up as a reply in the group
    pub async fn handle_portrait(ctx: BotContext, event: GroupMessageEvent, cmd: PortraitCommand) {
        let group_id = event.group_id;
        if let Err(e) = Self::run_portrait(&ctx, &event, &cmd).await {
            error!("Portrait command failed in group {}: {}", group_id, e);
            let text = ctx.config.language.analysis_failed(&e.to_string());
            if let Err(e) = Self::reply(&ctx, group_id, &text).await {
                error!("Failed to report failure to group {}: {}", group_id, e);
            }
        }
    }

    async fn run_portrait(
        ctx: &BotContext,
        event: &GroupMessageEvent,
        cmd: &PortraitCommand,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let lang = ctx.config.language;
        let group_id = event.group_id;
        let target_id = event.first_mention().unwrap_or_else(|| event.sender_id());
        let (nickname, gender) = Self::resolve_nickname_gender(ctx, group_id, &target_id).await;

        info!(
            "Portrait requested by {} for {} ({}) in group {}",
            event.user_id, target_id, nickname, group_id
        );

        let (texts, query_rounds) = match ctx.cache.get(&target_id).await {
            Some(texts) => (texts, None),
            None => {
                let rounds = cmd.query_rounds(ctx.config.max_query_rounds);
                Self::reply(ctx, group_id, &lang.querying_rounds(rounds, &nickname)).await?;

                let fetcher = HistoryFetcher::new(ctx.api.as_ref(), ctx.config.max_msg_count);
                let result = fetcher.fetch_user_texts(group_id, &target_id, rounds).await?;
                if !result.texts.is_empty() {
                    ctx.cache.insert(&target_id, result.texts.clone()).await;
                }
                (result.texts, Some(result.query_rounds))
            }
        };

        if texts.is_empty() {
            Self::reply(ctx, group_id, lang.no_messages_found()).await?;
            return Ok(());
        }

        let progress = match query_rounds {
            Some(rounds) => lang.fetched_from_history(
                rounds as u64 * crate::history::PAGE_SIZE as u64,
                texts.len(),
                &nickname,
            ),
            None => lang.fetched_from_cache(texts.len(), &nickname),
        };
        Self::reply(ctx, group_id, &progress).await?;

        let generator = PortraitGenerator::new(&ctx.providers, &ctx.config);
        match generator.generate(&nickname, gender, &texts).await {
            Some(portrait) if !portrait.trim().is_empty() => {
                Self::reply(ctx, group_id, &portrait).await?;
                ctx.cache.remove(&target_id).await;
            }
            _ => {
                Self::reply(ctx, group_id, lang.empty_llm_response()).await?;
            }
        }

        Ok(())
    }

    /// display name and gender from the member list, falling back to the raw id
    pub async fn resolve_nickname_gender(
        ctx: &BotContext,
        group_id: i64,
        target_id: &str,
    ) -> (String, Gender) {
        let Ok(user_id) = target_id.parse::<i64>() else {
            warn!("Target id {} is not numeric, skipping member lookup", target_id);
            return (target_id.to_string(), Gender::Unknown);
        };

        match ctx.api.get_group_member_info(group_id, user_id).await {
            Ok(info) => {
                let nickname = info
                    .display_name()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| target_id.to_string());
                (nickname, info.gender())
            }
            Err(e) => {
                warn!(
                    "Failed to look up member {} in group {}: {}",
                    target_id, group_id, e
                );
                (target_id.to_string(), Gender::Unknown)
            }
        }
    }

    async fn reply(ctx: &BotContext, group_id: i64, text: &str) -> Result<(), OneBotError> {
        for chunk in MessageFormatter::split_message_into_chunks(text, ctx.config.reply_max_chars) {
            ctx.api.send_group_msg(group_id, &chunk).await?;
        }
        Ok(())
    }
}
