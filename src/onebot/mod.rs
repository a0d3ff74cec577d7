pub mod events;
pub mod http;
pub mod types;

use async_trait::async_trait;
use std::error::Error;
use std::fmt;

pub use http::HttpOneBotClient;
pub use types::{GroupMessageEvent, HistoryMessage, HistoryPage, MemberInfo, MessageSegment};

#[derive(Debug)]
pub enum OneBotError {
    Transport(Box<dyn Error + Send + Sync>),
    Action {
        action: String,
        retcode: i64,
        message: String,
    },
    Decode(serde_json::Error),
    InvalidUrl(url::ParseError),
}

impl fmt::Display for OneBotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OneBotError::Transport(e) => write!(f, "OneBot transport error: {}", e),
            OneBotError::Action {
                action,
                retcode,
                message,
            } => write!(
                f,
                "OneBot action {} failed (retcode {}): {}",
                action, retcode, message
            ),
            OneBotError::Decode(e) => write!(f, "Failed to decode OneBot payload: {}", e),
            OneBotError::InvalidUrl(e) => write!(f, "Invalid OneBot url: {}", e),
        }
    }
}

impl Error for OneBotError {}

impl From<reqwest::Error> for OneBotError {
    fn from(err: reqwest::Error) -> Self {
        OneBotError::Transport(Box::new(err))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for OneBotError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        OneBotError::Transport(Box::new(err))
    }
}

impl From<serde_json::Error> for OneBotError {
    fn from(err: serde_json::Error) -> Self {
        OneBotError::Decode(err)
    }
}

impl From<url::ParseError> for OneBotError {
    fn from(err: url::ParseError) -> Self {
        OneBotError::InvalidUrl(err)
    }
}

/// the OneBot v11 actions the portrait flow needs
#[async_trait]
pub trait OneBotApi: Send + Sync {
    /// one page of group history; `message_seq = 0` starts from the newest message
    async fn get_group_msg_history(
        &self,
        group_id: i64,
        message_seq: i64,
        count: u32,
        reverse_order: bool,
    ) -> Result<HistoryPage, OneBotError>;

    async fn get_group_member_info(
        &self,
        group_id: i64,
        user_id: i64,
    ) -> Result<MemberInfo, OneBotError>;

    async fn send_group_msg(&self, group_id: i64, text: &str) -> Result<(), OneBotError>;
}
