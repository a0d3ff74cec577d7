use std::sync::Arc;

use qq_portrait::config::PortraitConfig;
use qq_portrait::llm::{ProviderRegistry, TextProvider};
use qq_portrait::localization::Lang;
use qq_portrait::onebot::types::Gender;
use qq_portrait::portrait::PortraitGenerator;
use qq_portrait::prompts::{build_system_prompt, build_user_prompt, render_template, TemplateError};

use super::mock_provider::MockProvider;
use super::test_utils::{registry_with, test_config};

fn texts() -> Vec<String> {
    vec!["早上好".to_string(), "今天吃什么".to_string()]
}

#[test]
fn test_render_template_substitutes_and_unescapes() {
    let rendered = render_template(
        "{{literal}} {nickname} and {gender}",
        &[("nickname", "小明"), ("gender", "他")],
    )
    .unwrap();
    assert_eq!(rendered, "{literal} 小明 and 他");
}

#[test]
fn test_render_template_rejects_lone_braces() {
    let vars = [("nickname", "小明")];

    assert_eq!(
        render_template("hello {nickname", &vars).unwrap_err(),
        TemplateError::UnmatchedBrace(6)
    );
    assert_eq!(
        render_template("a } b", &vars).unwrap_err(),
        TemplateError::UnmatchedBrace(2)
    );
}

#[test]
fn test_render_template_names_must_match_exactly() {
    let vars = [("nickname", "小明")];

    assert_eq!(
        render_template("{ nickname }", &vars).unwrap_err(),
        TemplateError::UnknownPlaceholder(" nickname ".to_string())
    );
    assert_eq!(
        render_template("{nickname:>4}", &vars).unwrap_err(),
        TemplateError::UnknownPlaceholder("nickname:>4".to_string())
    );
}

#[test]
fn test_render_template_rejects_unknown_placeholder() {
    let err = render_template("hi {age}", &[("nickname", "x")]).unwrap_err();
    assert_eq!(err, TemplateError::UnknownPlaceholder("age".to_string()));
}

#[test]
fn test_system_prompt_gender_pronoun() {
    let male = build_system_prompt("{nickname}:{gender}", "阿强", Gender::Male, Lang::Zh).unwrap();
    let female = build_system_prompt("{nickname}:{gender}", "阿珍", Gender::Female, Lang::Zh).unwrap();
    let unknown = build_system_prompt("{gender}", "某人", Gender::Unknown, Lang::Zh).unwrap();

    assert_eq!(male, "阿强:他");
    assert_eq!(female, "阿珍:她");
    assert_eq!(unknown, "她");
}

#[test]
fn test_user_prompt_enumerates_texts() {
    let prompt = build_user_prompt("小明", &texts());

    assert!(prompt.contains("【小明】"));
    assert!(prompt.contains("--- 聊天记录开始 ---\n1. 早上好\n2. 今天吃什么\n--- 聊天记录结束 ---"));
}

#[tokio::test]
async fn test_generate_uses_configured_provider() {
    let gemini = Arc::new(MockProvider::answering("gemini", "from gemini"));
    let openai = Arc::new(MockProvider::answering("openai", "from openai"));
    let registry = registry_with(vec![
        gemini.clone() as Arc<dyn TextProvider>,
        openai.clone() as Arc<dyn TextProvider>,
    ]);
    let config = PortraitConfig {
        provider_id: "openai".to_string(),
        ..test_config()
    };

    let generator = PortraitGenerator::new(&registry, &config);
    let portrait = generator.generate("小明", Gender::Male, &texts()).await;

    assert_eq!(portrait.as_deref(), Some("from openai"));
    assert!(gemini.calls().is_empty());
    let calls = openai.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].system_prompt, "describe 小明, talk about 他");
    assert!(calls[0].prompt.contains("1. 早上好"));
}

#[tokio::test]
async fn test_generate_falls_back_to_active_provider() {
    let gemini = Arc::new(MockProvider::answering("gemini", "from gemini"));
    let openai = Arc::new(MockProvider::answering("openai", "from openai"));
    let mut registry = registry_with(vec![
        gemini.clone() as Arc<dyn TextProvider>,
        openai.clone() as Arc<dyn TextProvider>,
    ]);
    registry.set_active("gemini");
    let config = PortraitConfig {
        provider_id: "missing".to_string(),
        ..test_config()
    };

    let generator = PortraitGenerator::new(&registry, &config);
    let portrait = generator.generate("小明", Gender::Female, &texts()).await;

    assert_eq!(portrait.as_deref(), Some("from gemini"));
    assert!(openai.calls().is_empty());
}

#[test]
fn test_using_provider_defaults_to_first_registered() {
    let registry = registry_with(vec![
        Arc::new(MockProvider::answering("first", "")) as Arc<dyn TextProvider>,
        Arc::new(MockProvider::answering("second", "")) as Arc<dyn TextProvider>,
    ]);

    let provider = registry.get_using_provider().expect("provider expected");
    assert_eq!(provider.id(), "first");
}

#[tokio::test]
async fn test_generate_without_provider_returns_none() {
    let registry = ProviderRegistry::new();
    let config = test_config();

    let generator = PortraitGenerator::new(&registry, &config);
    assert!(generator.resolve_provider().is_none());
    assert!(generator.generate("小明", Gender::Male, &texts()).await.is_none());
}

#[tokio::test]
async fn test_generate_provider_error_returns_none() {
    let provider = Arc::new(MockProvider::failing("gemini"));
    let registry = registry_with(vec![provider.clone() as Arc<dyn TextProvider>]);
    let config = test_config();

    let generator = PortraitGenerator::new(&registry, &config);
    assert!(generator.generate("小明", Gender::Male, &texts()).await.is_none());
    assert_eq!(provider.calls().len(), 1, "no retries by default");
}

#[tokio::test]
async fn test_generate_retries_after_failure() {
    let provider = Arc::new(MockProvider::new(
        "gemini",
        vec![Err("overloaded".to_string()), Ok("第二次成功".to_string())],
    ));
    let registry = registry_with(vec![provider.clone() as Arc<dyn TextProvider>]);
    let config = PortraitConfig {
        llm_max_retries: 1,
        ..test_config()
    };

    let generator = PortraitGenerator::new(&registry, &config);
    let portrait = generator.generate("小明", Gender::Male, &texts()).await;

    assert_eq!(portrait.as_deref(), Some("第二次成功"));
    assert_eq!(provider.calls().len(), 2);
}

#[tokio::test]
async fn test_generate_gives_up_after_retries_exhausted() {
    let provider = Arc::new(MockProvider::new(
        "gemini",
        vec![Err("overloaded".to_string()), Err("still overloaded".to_string())],
    ));
    let registry = registry_with(vec![provider.clone() as Arc<dyn TextProvider>]);
    let config = PortraitConfig {
        llm_max_retries: 1,
        ..test_config()
    };

    let generator = PortraitGenerator::new(&registry, &config);
    assert!(generator.generate("小明", Gender::Male, &texts()).await.is_none());
    assert_eq!(provider.calls().len(), 2);
}

#[tokio::test]
async fn test_generate_bad_template_skips_provider() {
    let provider = Arc::new(MockProvider::answering("gemini", "portrait"));
    let registry = registry_with(vec![provider.clone() as Arc<dyn TextProvider>]);
    let config = PortraitConfig {
        system_prompt_template: "who is {name}".to_string(),
        ..test_config()
    };

    let generator = PortraitGenerator::new(&registry, &config);
    assert!(generator.generate("小明", Gender::Male, &texts()).await.is_none());
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_empty_completion_counts_as_failure() {
    let provider = Arc::new(MockProvider::new("gemini", vec![Ok("   ".to_string())]));
    let registry = registry_with(vec![provider.clone() as Arc<dyn TextProvider>]);
    let config = test_config();

    let generator = PortraitGenerator::new(&registry, &config);
    assert!(generator.generate("小明", Gender::Male, &texts()).await.is_none());
}
