use log::info;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// texts collected per user, kept until a portrait for that user succeeds
#[derive(Clone, Default)]
pub struct TextsCache {
    entries: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl TextsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: &str) -> Option<Vec<String>> {
        let entries = self.entries.lock().await;
        let texts = entries.get(user_id).cloned();
        if let Some(texts) = &texts {
            info!("Cache hit for user {} ({} texts)", user_id, texts.len());
        }
        texts
    }

    pub async fn insert(&self, user_id: &str, texts: Vec<String>) {
        info!("Caching {} texts for user {}", texts.len(), user_id);
        self.entries.lock().await.insert(user_id.to_string(), texts);
    }

    pub async fn remove(&self, user_id: &str) -> bool {
        let removed = self.entries.lock().await.remove(user_id).is_some();
        if removed {
            info!("Evicted cached texts for user {}", user_id);
        }
        removed
    }

    pub async fn contains(&self, user_id: &str) -> bool {
        self.entries.lock().await.contains_key(user_id)
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        info!("Clearing texts cache ({} users)", entries.len());
        entries.clear();
    }
}
