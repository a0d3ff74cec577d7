pub mod bot;
pub mod cache;
pub mod config;
pub mod handlers;
pub mod history;
pub mod llm;
pub mod localization;
pub mod onebot;
pub mod portrait;
pub mod prompts;
pub mod utils;
