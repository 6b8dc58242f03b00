use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// Shared key-value context carried through a wizard session.
///
/// Steps read their input and the partially assembled claim record from here
/// and write their results back. Cloning is cheap; all clones share the same
/// underlying map.
#[derive(Clone, Debug, Default)]
pub struct Context {
    data: Arc<DashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: impl serde::Serialize) {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.data.insert(key.into(), value);
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize context value, dropping");
            }
        }
    }

    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_sync(key)
    }

    /// Non-async accessor for use inside synchronous guards.
    pub fn get_sync<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }

    pub async fn clear(&self) {
        self.data.clear();
    }
}
