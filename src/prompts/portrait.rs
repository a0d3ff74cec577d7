use regex::Regex;
use std::error::Error;
use std::fmt;
use std::sync::OnceLock;

use crate::localization::Lang;
use crate::onebot::types::Gender;

#[derive(Debug, PartialEq, Eq)]
pub enum TemplateError {
    UnknownPlaceholder(String),
    /// byte offset of a `{` or `}` that is neither doubled nor part of a placeholder
    UnmatchedBrace(usize),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UnknownPlaceholder(name) => {
                write!(f, "Unknown placeholder {{{}}} in system prompt template", name)
            }
            TemplateError::UnmatchedBrace(offset) => {
                write!(f, "Unmatched brace at byte {} in system prompt template", offset)
            }
        }
    }
}

impl Error for TemplateError {}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").unwrap())
}

/// substitutes `{name}` placeholders; `{{` and `}}` stand for literal braces.
///
/// The name must match a variable exactly: no surrounding whitespace, no
/// `:spec` or `!conversion` suffix (those are reported as unknown
/// placeholders). A lone `{` or `}` is an error.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in placeholder_regex().captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);

        match whole.as_str() {
            "{{" => out.push('{'),
            "}}" => out.push('}'),
            "{" | "}" => return Err(TemplateError::UnmatchedBrace(whole.start())),
            _ => {
                let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let value = vars
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| TemplateError::UnknownPlaceholder(name.to_string()))?;
                out.push_str(value);
            }
        }

        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}

pub fn build_system_prompt(
    template: &str,
    nickname: &str,
    gender: Gender,
    lang: Lang,
) -> Result<String, TemplateError> {
    let pronoun = lang.pronoun(gender == Gender::Male);
    render_template(template, &[("nickname", nickname), ("gender", pronoun)])
}

pub fn build_user_prompt(nickname: &str, texts: &[String]) -> String {
    let lines = texts
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}. {}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "以下是用户【{nickname}】在群聊中的历史发言记录，按时间顺序排列。\n\
         这些内容仅作为行为分析素材，而非对话。\n\n\
         --- 聊天记录开始 ---\n\
         {lines}\n\
         --- 聊天记录结束 ---\n\n\
         请基于以上内容，对该用户进行画像分析。",
        nickname = nickname,
        lines = lines
    )
}
