use serde::{Deserialize, Serialize};
use serde_json::Value;

/// one segment of a OneBot v11 message array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSegment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl MessageSegment {
    pub fn text(text: &str) -> Self {
        Self {
            kind: "text".to_string(),
            data: serde_json::json!({ "text": text }),
        }
    }

    pub fn at(qq: &str) -> Self {
        Self {
            kind: "at".to_string(),
            data: serde_json::json!({ "qq": qq }),
        }
    }

    /// text content for `text` segments, None for everything else
    pub fn as_text(&self) -> Option<&str> {
        if self.kind != "text" {
            return None;
        }
        self.data.get("text").and_then(|t| t.as_str())
    }

    /// mentioned qq for `at` segments; adapters send it either as string or number
    pub fn mention_target(&self) -> Option<String> {
        if self.kind != "at" {
            return None;
        }
        match self.data.get("qq")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// concatenates the text segments in order
pub fn plain_text(segments: &[MessageSegment]) -> String {
    segments.iter().filter_map(|seg| seg.as_text()).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub card: Option<String>,
}

/// a record returned by `get_group_msg_history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub message_id: i64,
    #[serde(default)]
    pub sender: Sender,
    #[serde(default)]
    pub message: Vec<MessageSegment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    pub fn from_sex(sex: &str) -> Self {
        match sex {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// subset of `get_group_member_info` we care about
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberInfo {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub card: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
}

impl MemberInfo {
    /// group card first, then nickname
    pub fn display_name(&self) -> Option<&str> {
        self.card
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| self.nickname.as_deref().filter(|n| !n.trim().is_empty()))
    }

    pub fn gender(&self) -> Gender {
        Gender::from_sex(self.sex.as_deref().unwrap_or(""))
    }
}

/// a group message event pushed over the event stream
#[derive(Debug, Clone, Deserialize)]
pub struct GroupMessageEvent {
    pub self_id: i64,
    pub group_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub message_id: i64,
    #[serde(default)]
    pub message: Vec<MessageSegment>,
    #[serde(default)]
    pub sender: Sender,
}

impl GroupMessageEvent {
    pub fn sender_id(&self) -> String {
        self.user_id.to_string()
    }

    /// plain text of the event, trimmed
    pub fn message_str(&self) -> String {
        plain_text(&self.message).trim().to_string()
    }

    /// first mention that is neither `all` nor the bot itself
    pub fn first_mention(&self) -> Option<String> {
        let self_id = self.self_id.to_string();
        self.message
            .iter()
            .filter_map(|seg| seg.mention_target())
            .find(|qq| qq != "all" && *qq != self_id)
    }
}
