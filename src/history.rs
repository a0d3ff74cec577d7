use log::info;

use crate::onebot::{HistoryMessage, OneBotApi, OneBotError};

/// messages requested per round
pub const PAGE_SIZE: u32 = 200;
/// upper bound for the round count a command may ask for
pub const MAX_ROUNDS: u32 = 200;

/// texts sent by `target_id`, one entry per message with its text segments joined and trimmed
pub fn build_user_texts(round_messages: &[HistoryMessage], target_id: &str) -> Vec<String> {
    round_messages
        .iter()
        .filter(|msg| msg.sender.user_id.to_string() == target_id)
        .map(|msg| {
            msg.message
                .iter()
                .filter_map(|seg| seg.as_text())
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|text| !text.is_empty())
        .collect()
}

#[derive(Debug, Default)]
pub struct FetchResult {
    pub texts: Vec<String>,
    pub query_rounds: u32,
}

/// pages backwards through a group's history collecting the target's texts
pub struct HistoryFetcher<'a> {
    api: &'a dyn OneBotApi,
    max_msg_count: usize,
}

impl<'a> HistoryFetcher<'a> {
    pub fn new(api: &'a dyn OneBotApi, max_msg_count: usize) -> Self {
        Self { api, max_msg_count }
    }

    /// stops when enough texts are collected, a page comes back empty, or
    /// `max_query_rounds` rounds have completed (at least one round always runs)
    pub async fn fetch_user_texts(
        &self,
        group_id: i64,
        target_id: &str,
        max_query_rounds: u32,
    ) -> Result<FetchResult, OneBotError> {
        let mut query_rounds: u32 = 0;
        let mut message_seq: i64 = 0;
        let mut texts: Vec<String> = Vec::new();

        while texts.len() < self.max_msg_count {
            let page = self
                .api
                .get_group_msg_history(group_id, message_seq, PAGE_SIZE, true)
                .await?;

            let Some(first) = page.messages.first() else {
                info!("Group {} history exhausted after {} rounds", group_id, query_rounds);
                break;
            };
            message_seq = first.message_id;

            let round_texts = build_user_texts(&page.messages, target_id);
            info!(
                "Round {}: {} of {} messages belong to {}",
                query_rounds + 1,
                round_texts.len(),
                page.messages.len(),
                target_id
            );
            texts.extend(round_texts);

            query_rounds += 1;
            if query_rounds >= max_query_rounds {
                break;
            }
        }

        info!(
            "Collected {} texts for {} in group {} over {} rounds",
            texts.len(),
            target_id,
            group_id,
            query_rounds
        );

        Ok(FetchResult {
            texts,
            query_rounds,
        })
    }
}
