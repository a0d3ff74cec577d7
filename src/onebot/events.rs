use futures::StreamExt;
use log::{debug, error, info, warn};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use url::Url;

use super::{GroupMessageEvent, OneBotError};
use crate::llm::calculate_delay;

// reconnect backoff stops growing after 2^5 seconds
const MAX_BACKOFF_EXPONENT: u32 = 5;

/// decodes a raw event frame; Ok(None) for anything that is not a group message
pub fn parse_group_message(raw: &str) -> Result<Option<GroupMessageEvent>, OneBotError> {
    let value: Value = serde_json::from_str(raw)?;

    let post_type = value.get("post_type").and_then(|v| v.as_str());
    let message_type = value.get("message_type").and_then(|v| v.as_str());
    if post_type != Some("message") || message_type != Some("group") {
        return Ok(None);
    }

    if value.get("message").map(|m| m.is_string()).unwrap_or(false) {
        warn!("Received a string-format message; configure the adapter with message_format=array");
        return Ok(None);
    }

    Ok(Some(serde_json::from_value(value)?))
}

fn build_ws_url(ws_url: &str, access_token: Option<&str>) -> Result<Url, OneBotError> {
    let mut url = Url::parse(ws_url)?;
    if let Some(token) = access_token.filter(|t| !t.is_empty()) {
        url.query_pairs_mut().append_pair("access_token", token);
    }
    Ok(url)
}

/// connects to the adapter's forward websocket and forwards group messages
/// until the receiver is dropped; reconnects on any connection failure
pub async fn listen_group_messages(
    ws_url: String,
    access_token: Option<String>,
    tx: mpsc::Sender<GroupMessageEvent>,
) -> Result<(), OneBotError> {
    let url = build_ws_url(&ws_url, access_token.as_deref())?;
    let mut attempt: u32 = 0;

    loop {
        match run_connection(&url, &tx, &mut attempt).await {
            Ok(()) => {
                info!("Event receiver closed, stopping websocket listener");
                return Ok(());
            }
            Err(e) => {
                let delay = calculate_delay(attempt.min(MAX_BACKOFF_EXPONENT));
                error!(
                    "OneBot websocket error: {}. Reconnecting in {}ms",
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt = attempt.saturating_add(1);
            }
        }
    }
}

/// Ok(()) only when the receiving side has gone away
async fn run_connection(
    url: &Url,
    tx: &mpsc::Sender<GroupMessageEvent>,
    attempt: &mut u32,
) -> Result<(), OneBotError> {
    let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
    *attempt = 0;
    info!("Connected to OneBot event stream at {}", url.host_str().unwrap_or("?"));

    let (_write, mut read) = ws_stream.split();

    while let Some(frame) = read.next().await {
        let text = match frame? {
            WsMessage::Text(t) => t.to_string(),
            WsMessage::Close(_) => {
                return Err(OneBotError::Transport("websocket closed by server".into()));
            }
            // tungstenite answers pings itself
            _ => continue,
        };

        match parse_group_message(&text) {
            Ok(Some(event)) => {
                if tx.send(event).await.is_err() {
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(e) => debug!("Skipping undecodable event: {}", e),
        }
    }

    Err(OneBotError::Transport("websocket stream ended".into()))
}
