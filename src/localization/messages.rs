use serde::Deserialize;

/// supported languages for bot replies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    Zh,
    En,
}

impl Lang {
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("en") => Lang::En,
            _ => Lang::Zh,
        }
    }
}

// =============================================================================
// Progress messages
// =============================================================================

impl Lang {
    pub fn querying_rounds(&self, rounds: u32, nickname: &str) -> String {
        match self {
            Lang::Zh => format!("正在发起{}轮查询来获取{}的消息...", rounds, nickname),
            Lang::En => format!(
                "Running {} rounds of history queries to collect messages from {}...",
                rounds, nickname
            ),
        }
    }

    pub fn fetched_from_history(&self, scanned: u64, count: usize, nickname: &str) -> String {
        match self {
            Lang::Zh => format!(
                "已从{}条群消息中获取了{}条{}的消息，正在分析...",
                scanned, count, nickname
            ),
            Lang::En => format!(
                "Collected {} messages from {} out of {} group messages, analyzing...",
                count, nickname, scanned
            ),
        }
    }

    pub fn fetched_from_cache(&self, count: usize, nickname: &str) -> String {
        match self {
            Lang::Zh => format!("已从缓存中获取了{}条{}的消息，正在分析...", count, nickname),
            Lang::En => format!(
                "Loaded {} cached messages from {}, analyzing...",
                count, nickname
            ),
        }
    }
}

// =============================================================================
// Error messages
// =============================================================================

impl Lang {
    pub fn no_messages_found(&self) -> &'static str {
        match self {
            Lang::Zh => "没有找到该群友的任何消息",
            Lang::En => "No messages from this member were found",
        }
    }

    pub fn empty_llm_response(&self) -> &'static str {
        match self {
            Lang::Zh => "LLM响应为空",
            Lang::En => "The LLM returned no response",
        }
    }

    pub fn analysis_failed(&self, error: &str) -> String {
        match self {
            Lang::Zh => format!("分析失败:{}", error),
            Lang::En => format!("Analysis failed: {}", error),
        }
    }
}

// =============================================================================
// Prompt gender words
// =============================================================================

impl Lang {
    /// third-person pronoun substituted into the system prompt
    pub fn pronoun(&self, male: bool) -> &'static str {
        match (self, male) {
            (Lang::Zh, true) => "他",
            (Lang::Zh, false) => "她",
            (Lang::En, true) => "him",
            (Lang::En, false) => "her",
        }
    }
}
