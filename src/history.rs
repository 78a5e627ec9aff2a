use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

use crate::types::ContentType;

pub const HISTORY_KEY: &str = "ai_content_history";
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub text: String,
    pub content_type: ContentType,
    pub prompt: String,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// The id is the creation time in milliseconds.
    pub fn new(
        text: String,
        content_type: ContentType,
        prompt: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: created_at.timestamp_millis().to_string(),
            text,
            content_type,
            prompt,
            created_at,
        }
    }

    /// File name offered when the entry is downloaded.
    pub fn download_name(&self) -> String {
        download_name(self.content_type, self.created_at)
    }
}

pub fn download_name(content_type: ContentType, at: DateTime<Utc>) -> String {
    format!("{}-content-{}.txt", content_type, at.timestamp_millis())
}

/// Single-slot string storage. Browser local storage in the app, a map in
/// tests.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `window.localStorage`, resolved on each access so the type can be built
/// during server rendering where there is no window.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl KvStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()
            .ok_or(StorageError::Unavailable)?
            .set_item(key, value)
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }
}

/// Most-recent-first list of finished generations, capped at
/// `HISTORY_LIMIT` and written through to the store on every change.
pub struct HistoryStore<S> {
    store: S,
    entries: Vec<HistoryEntry>,
}

impl<S: KvStore> HistoryStore<S> {
    /// A history over `store` that has not read it yet.
    pub fn empty(store: S) -> Self {
        Self {
            store,
            entries: Vec::new(),
        }
    }

    /// Loads persisted entries. Missing or unreadable data starts an empty
    /// history.
    pub fn load(store: S) -> Self {
        let entries = match store.get(HISTORY_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(HISTORY_LIMIT);
                    entries
                }
                Err(e) => {
                    log::warn!("Failed to parse history, starting empty: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Self { store, entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn save(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, &raw)
    }

    /// Records a completed generation at the front, evicting the oldest
    /// entries past the limit.
    pub fn commit(&mut self, mut entry: HistoryEntry) -> Result<(), StorageError> {
        while self.entries.iter().any(|e| e.id == entry.id) {
            let next = entry.id.parse::<i64>().map(|ms| ms + 1).unwrap_or_default();
            entry.id = next.to_string();
        }
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
        self.save()
    }

    pub fn remove(&mut self, id: &str) -> Result<(), StorageError> {
        self.entries.retain(|e| e.id != id);
        self.save()
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry_at(ms: i64, text: &str) -> HistoryEntry {
        let at = Utc.timestamp_millis_opt(ms).unwrap();
        HistoryEntry::new(text.to_string(), ContentType::Blog, "topic".to_string(), at)
    }

    #[test]
    fn test_never_exceeds_limit() {
        let mut history = HistoryStore::load(MemoryStore::new());
        for i in 0..25 {
            history.commit(entry_at(1_000 + i, &format!("gen {i}"))).unwrap();
            assert!(history.entries().len() <= HISTORY_LIMIT);
        }
        assert_eq!(history.entries().len(), HISTORY_LIMIT);
    }

    #[test]
    fn test_eleventh_completion_evicts_oldest() {
        let mut history = HistoryStore::load(MemoryStore::new());
        for i in 1..=11 {
            history.commit(entry_at(i * 1_000, &format!("gen {i}"))).unwrap();
        }
        let texts: Vec<_> = history.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts[0], "gen 11");
        assert_eq!(texts[9], "gen 2");
        assert!(!texts.contains(&"gen 1"));
    }

    #[test]
    fn test_round_trip_restores_timestamps() {
        let store = MemoryStore::new();
        let mut history = HistoryStore::load(store);
        history.commit(entry_at(1_700_000_000_123, "first")).unwrap();
        history.commit(entry_at(1_700_000_005_000, "second")).unwrap();

        let reloaded = HistoryStore::load(history.store);
        assert_eq!(reloaded.entries().len(), 2);
        assert_eq!(reloaded.entries()[0].text, "second");
        assert_eq!(
            reloaded.entries()[1].created_at,
            Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
        );
    }

    #[test]
    fn test_corrupt_data_is_empty_history() {
        let store = MemoryStore::new();
        store.set(HISTORY_KEY, "{not json").unwrap();
        assert!(HistoryStore::load(store).entries().is_empty());

        let store = MemoryStore::new();
        store.set(HISTORY_KEY, r#"[{"id": 5}]"#).unwrap();
        assert!(HistoryStore::load(store).entries().is_empty());
    }

    #[test]
    fn test_reads_legacy_timestamp_field() {
        let store = MemoryStore::new();
        store
            .set(
                HISTORY_KEY,
                r#"[{"id":"1","text":"hi","contentType":"email","prompt":"p","timestamp":"2024-05-01T10:00:00.000Z"}]"#,
            )
            .unwrap();
        let history = HistoryStore::load(store);
        assert_eq!(history.entries()[0].content_type, ContentType::Email);
        assert_eq!(
            history.entries()[0].created_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_oversized_persisted_list_is_capped() {
        let entries: Vec<_> = (0..15).map(|i| entry_at(i, "x")).collect();
        let store = MemoryStore::new();
        store
            .set(HISTORY_KEY, &serde_json::to_string(&entries).unwrap())
            .unwrap();
        assert_eq!(HistoryStore::load(store).entries().len(), HISTORY_LIMIT);
    }

    #[test]
    fn test_same_millisecond_gets_unique_id() {
        let mut history = HistoryStore::load(MemoryStore::new());
        history.commit(entry_at(5_000, "a")).unwrap();
        history.commit(entry_at(5_000, "b")).unwrap();
        assert_eq!(history.entries()[0].id, "5001");
        assert_eq!(history.entries()[1].id, "5000");
    }

    #[test]
    fn test_remove_and_clear_persist() {
        let mut history = HistoryStore::load(MemoryStore::new());
        history.commit(entry_at(1, "a")).unwrap();
        history.commit(entry_at(2, "b")).unwrap();
        history.remove("1").unwrap();
        assert_eq!(history.entries().len(), 1);

        let persisted = history.store.get(HISTORY_KEY).unwrap();
        assert!(!persisted.contains("\"id\":\"1\""));

        history.clear().unwrap();
        assert_eq!(history.store.get(HISTORY_KEY).unwrap(), "[]");
    }

    #[test]
    fn test_download_name() {
        let entry = entry_at(1_234, "x");
        assert_eq!(entry.download_name(), "blog-content-1234.txt");
    }
}
