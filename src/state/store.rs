use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// The persisted document: one object of arbitrary keys under `appState`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(rename = "appState")]
    pub app_state: Map<String, Value>,
}

type StateChangeHandler = Box<dyn Fn(&str, &Value) + Send>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    handlers: Vec<(u64, StateChangeHandler)>,
}

/// Small JSON key/value store that rewrites its file on every change
pub struct StateStore {
    path: PathBuf,
    subscribers: Arc<Mutex<Subscribers>>,
}

/// Keeps a change handler registered until dropped
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    subscribers: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    /// Unsubscribe explicitly; same as dropping
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.lock().handlers.retain(|(id, _)| *id != self.id);
        }
    }
}

impl StateStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document; a missing or corrupt file yields the empty default
    pub fn load(&self) -> StateDocument {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return StateDocument::default(),
        };

        let parsed: Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring unreadable state file {}: {}", self.path.display(), e);
                return StateDocument::default();
            }
        };

        let app_state = match parsed.get("appState") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        StateDocument { app_state }
    }

    /// Write the whole document
    pub fn save(&self, document: &StateDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write state to {}", self.path.display()))?;
        Ok(())
    }

    /// Raw value for `key`, if present
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.load().app_state.get(key).cloned()
    }

    /// Typed value for `key`; absent or mistyped values yield `default`
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get_value(key) {
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                debug!("State key {} has an unexpected shape: {}", key, e);
                default
            }),
            None => default,
        }
    }

    /// Store `value` under `key`, rewrite the file, then notify subscribers
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        let mut document = self.load();
        document.app_state.insert(key.to_string(), value.clone());
        self.save(&document)?;
        self.notify(key, &value);
        Ok(())
    }

    /// Register a change handler.
    ///
    /// Handlers run synchronously inside `set` and must not call back into
    /// `subscribe` on the same store.
    pub fn subscribe<H>(&self, handler: H) -> Subscription
    where
        H: Fn(&str, &Value) + Send + 'static,
    {
        let mut subscribers = self.subscribers.lock();
        subscribers.next_id += 1;
        let id = subscribers.next_id;
        subscribers.handlers.push((id, Box::new(handler)));
        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().handlers.len()
    }

    fn notify(&self, key: &str, value: &Value) {
        let subscribers = self.subscribers.lock();
        for (_, handler) in &subscribers.handlers {
            handler(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> StateStore {
        StateStore::new(temp_dir.path().join("nested").join("state.json"))
    }

    #[test]
    fn test_missing_file_is_empty_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        assert_eq!(store.load(), StateDocument::default());
        assert_eq!(store.get("markers", vec!["x".to_string()]), vec!["x".to_string()]);
    }

    #[test]
    fn test_set_persists_whole_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        store.set("markers", &vec!["TODO:", "FIXME"]).unwrap();
        store.set("theme", &"light").unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({ "appState": { "markers": ["TODO:", "FIXME"], "theme": "light" } })
        );
        assert_eq!(
            store.get::<Vec<String>>("markers", vec![]),
            vec!["TODO:".to_string(), "FIXME".to_string()]
        );
    }

    #[test]
    fn test_corrupt_or_misshaped_documents_reset() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();

        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load(), StateDocument::default());

        fs::write(store.path(), r#"{"appState": [1, 2], "other": true}"#).unwrap();
        assert!(store.load().app_state.is_empty());

        fs::write(store.path(), r#"{"appState": {"k": 1}, "unknown": {}}"#).unwrap();
        assert_eq!(store.get_value("k"), Some(json!(1)));
    }

    #[test]
    fn test_mistyped_value_yields_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.set("markers", &42).unwrap();

        assert_eq!(store.get::<Vec<String>>("markers", vec![]), Vec::<String>::new());
    }

    #[test]
    fn test_subscribers_are_notified_until_dropped() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let (tx, rx) = mpsc::channel();

        let subscription = store.subscribe(move |key, value| {
            let _ = tx.send((key.to_string(), value.clone()));
        });
        assert_eq!(store.subscriber_count(), 1);

        store.set("theme", &"dark").unwrap();
        assert_eq!(rx.try_recv().unwrap(), ("theme".to_string(), json!("dark")));

        subscription.unsubscribe();
        assert_eq!(store.subscriber_count(), 0);
        store.set("theme", &"light").unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_failed_write_does_not_notify() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should be makes the write fail
        let path = temp_dir.path().join("state.json");
        fs::create_dir_all(&path).unwrap();
        let store = StateStore::new(path);
        let (tx, rx) = mpsc::channel();
        let _subscription = store.subscribe(move |key, _| {
            let _ = tx.send(key.to_string());
        });

        assert!(store.set("theme", &"dark").is_err());
        assert!(rx.try_recv().is_err());
    }
}
