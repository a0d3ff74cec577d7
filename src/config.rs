use log::info;
use serde::Deserialize;
use std::env;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::localization::Lang;

pub const DEFAULT_SYSTEM_PROMPT_TEMPLATE: &str = "你是一名擅长行为分析的心理观察者。\
接下来你会看到群友{nickname}在群聊中的历史发言，请据此为{gender}绘制一份画像：\
包括性格特点、兴趣爱好、说话风格、社交习惯与情绪倾向。\
分析要有理有据，可以适当引用原话，语气友善而不失犀利，不要编造记录中没有的信息。";

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} environment variable is required", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {}", key, value)
            }
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config file: {}", e),
        }
    }
}

impl Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

/// settings of the portrait command
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortraitConfig {
    /// stop fetching once this many texts of the target are collected
    pub max_msg_count: usize,
    /// round count used when the command carries no number
    pub max_query_rounds: u32,
    /// provider to use; empty means the active one
    pub provider_id: String,
    pub system_prompt_template: String,
    pub wake_prefixes: Vec<String>,
    pub llm_max_retries: u32,
    pub reply_max_chars: usize,
    pub language: Lang,
}

impl Default for PortraitConfig {
    fn default() -> Self {
        Self {
            max_msg_count: 500,
            max_query_rounds: 20,
            provider_id: String::new(),
            system_prompt_template: DEFAULT_SYSTEM_PROMPT_TEMPLATE.to_string(),
            wake_prefixes: vec!["/".to_string(), String::new()],
            llm_max_retries: 0,
            reply_max_chars: 3000,
            language: Lang::Zh,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(None),
    }
}

impl PortraitConfig {
    /// reads the optional JSON file, then applies environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                info!("Loading portrait config from {}", path.display());
                let raw = fs::read_to_string(path)?;
                serde_json::from_str::<PortraitConfig>(&raw)?
            }
            None => PortraitConfig::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// checks the merged settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reply_max_chars == 0 {
            return Err(ConfigError::Invalid {
                key: "reply_max_chars",
                value: self.reply_max_chars.to_string(),
            });
        }
        Ok(())
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = parse_env("PORTRAIT_MAX_MSG_COUNT")? {
            self.max_msg_count = v;
        }
        if let Some(v) = parse_env("PORTRAIT_MAX_QUERY_ROUNDS")? {
            self.max_query_rounds = v;
        }
        if let Ok(v) = env::var("PORTRAIT_PROVIDER_ID") {
            self.provider_id = v.trim().to_string();
        }
        if let Ok(v) = env::var("PORTRAIT_SYSTEM_PROMPT_TEMPLATE") {
            if !v.trim().is_empty() {
                self.system_prompt_template = v;
            }
        }
        if let Ok(v) = env::var("PORTRAIT_WAKE_PREFIXES") {
            // a trailing comma keeps the bare command enabled
            self.wake_prefixes = v.split(',').map(|p| p.trim().to_string()).collect();
        }
        if let Some(v) = parse_env("PORTRAIT_LLM_MAX_RETRIES")? {
            self.llm_max_retries = v;
        }
        if let Some(v) = parse_env("PORTRAIT_REPLY_MAX_CHARS")? {
            self.reply_max_chars = v;
        }
        if let Ok(v) = env::var("PORTRAIT_LANG") {
            self.language = Lang::from_code(Some(v.trim()));
        }
        Ok(())
    }
}

/// where the OneBot adapter lives
#[derive(Debug, Clone)]
pub struct OneBotConfig {
    pub http_url: String,
    pub ws_url: String,
    pub access_token: Option<String>,
}

impl OneBotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_url = env::var("ONEBOT_HTTP_URL").map_err(|_| ConfigError::Missing("ONEBOT_HTTP_URL"))?;
        let ws_url = env::var("ONEBOT_WS_URL").map_err(|_| ConfigError::Missing("ONEBOT_WS_URL"))?;
        let access_token = env::var("ONEBOT_ACCESS_TOKEN").ok().filter(|t| !t.is_empty());

        Ok(Self {
            http_url,
            ws_url,
            access_token,
        })
    }
}
