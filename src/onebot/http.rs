use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use super::{HistoryPage, MemberInfo, MessageSegment, OneBotApi, OneBotError};

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// response envelope shared by every OneBot v11 action
#[derive(Debug, Deserialize)]
struct ActionResponse {
    status: String,
    #[serde(default)]
    retcode: i64,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    wording: Option<String>,
}

/// calls OneBot actions over the adapter's HTTP API
pub struct HttpOneBotClient {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl HttpOneBotClient {
    pub fn new(base_url: &str, access_token: Option<String>) -> Result<Self, OneBotError> {
        // a trailing slash makes Url::join append instead of replacing the last path segment
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url,
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }

    pub async fn call_action<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Value,
    ) -> Result<T, OneBotError> {
        let url = self.base_url.join(action)?;
        debug!("Calling OneBot action {} with {}", action, params);

        let mut request = self.client.post(url).json(&params);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("OneBot action {} returned HTTP {}", action, status);
            return Err(OneBotError::Action {
                action: action.to_string(),
                retcode: status.as_u16() as i64,
                message: body,
            });
        }

        let envelope: ActionResponse = response.json().await?;
        if envelope.status != "ok" {
            return Err(OneBotError::Action {
                action: action.to_string(),
                retcode: envelope.retcode,
                message: envelope
                    .wording
                    .or(envelope.message)
                    .unwrap_or_else(|| envelope.status.clone()),
            });
        }

        Ok(serde_json::from_value(envelope.data)?)
    }
}

#[async_trait]
impl OneBotApi for HttpOneBotClient {
    async fn get_group_msg_history(
        &self,
        group_id: i64,
        message_seq: i64,
        count: u32,
        reverse_order: bool,
    ) -> Result<HistoryPage, OneBotError> {
        self.call_action(
            "get_group_msg_history",
            json!({
                "group_id": group_id,
                "message_seq": message_seq,
                "count": count,
                "reverseOrder": reverse_order,
            }),
        )
        .await
    }

    async fn get_group_member_info(
        &self,
        group_id: i64,
        user_id: i64,
    ) -> Result<MemberInfo, OneBotError> {
        self.call_action(
            "get_group_member_info",
            json!({
                "group_id": group_id,
                "user_id": user_id,
                "no_cache": false,
            }),
        )
        .await
    }

    async fn send_group_msg(&self, group_id: i64, text: &str) -> Result<(), OneBotError> {
        let _: Value = self
            .call_action(
                "send_group_msg",
                json!({
                    "group_id": group_id,
                    "message": [MessageSegment::text(text)],
                }),
            )
            .await?;
        Ok(())
    }
}
