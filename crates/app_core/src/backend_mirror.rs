//! Local copy of the status the backend pushes with `BACKEND_STATE_UPDATE`

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendState {
    /// Catalog file the backend currently serves, empty when unnamed
    pub catalog_path: String,
    pub preview_queue_size: u64,
}

#[derive(Debug, Default)]
pub struct BackendMirror {
    state: BackendState,
}

impl BackendMirror {
    pub fn state(&self) -> &BackendState {
        &self.state
    }

    /// Catalog path, if the backend has one
    pub fn catalog_path(&self) -> Option<&str> {
        Some(self.state.catalog_path.as_str()).filter(|p| !p.is_empty())
    }

    pub fn set_catalog_path(&mut self, path: impl Into<String>) {
        self.state.catalog_path = path.into();
    }

    /// Merge a partial update; unknown or mistyped keys are skipped
    pub fn merge(&mut self, update: &Map<String, Value>) {
        for (key, value) in update {
            match (key.as_str(), value) {
                ("catalogPath", Value::String(path)) => self.state.catalog_path = path.clone(),
                ("catalogPath", Value::Null) => self.state.catalog_path.clear(),
                ("previewQueueSize", Value::Number(n)) if n.is_u64() => {
                    self.state.preview_queue_size = n.as_u64().unwrap_or_default();
                }
                _ => tracing::warn!("Ignoring backend state key {:?} = {}", key, value),
            }
        }
        tracing::debug!("Backend state: {:?}", self.state);
    }
}
