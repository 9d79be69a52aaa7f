//! Catalog files: `{ "path": ..., "state": ... }` JSON documents

use crate::model::State;
use crate::schema::{migrate, HistoricalState};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk catalog document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogFile {
    pub path: String,
    pub state: State,
}

impl CatalogFile {
    pub fn new(path: impl Into<String>, state: State) -> Self {
        Self {
            path: path.into(),
            state,
        }
    }

    /// Parse a catalog document of any supported version
    pub fn from_json(text: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(text)?;
        strip_nulls(&mut value);

        let path = value
            .get("path")
            .and_then(|p| p.as_str())
            .unwrap_or_default()
            .to_string();
        let state_value = value
            .get_mut("state")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null);

        let state = migrate(HistoricalState::from_value(state_value)?);
        Ok(Self { path, state })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load and migrate a catalog from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(
            "Catalog loaded from {:?} ({} images)",
            path,
            catalog.state.images.len()
        );
        Ok(catalog)
    }

    /// Write the catalog, replacing any previous file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, self.to_json()?)?;
        std::fs::rename(&tmp_path, path)?;

        tracing::info!("Catalog saved to {:?}", path);
        Ok(())
    }
}

/// `null` and absent are the same thing in catalog documents
fn strip_nulls(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageList, ImageMetadata, Label};
    use crate::DbError;
    use ipc_proto::ImageFile;
    use tempfile::TempDir;

    fn sample_state() -> State {
        let mut state = State::default();
        let image = ImageFile::new("a", "/photos/a.jpg");
        state.images.insert("a".into(), image);
        state.metadata.insert(
            "a".into(),
            ImageMetadata {
                label: Label::Cyan,
                ..Default::default()
            },
        );
        let mut list = ImageList::default();
        list.presence_map.insert("a".into());
        list.items.push("a".into());
        state.lists.insert(String::new(), list);
        state.paths.insert("/photos".into());
        state.selection.primary = Some("a".into());
        state
    }

    #[test]
    fn test_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("catalog.json");

        let catalog = CatalogFile::new(path.display().to_string(), sample_state());
        catalog.save(&path).unwrap();

        let loaded = CatalogFile::load(&path).unwrap();
        assert_eq!(loaded, catalog);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_nulls_treated_as_absent() {
        let mut value = serde_json::to_value(CatalogFile::new("x", sample_state())).unwrap();
        value["state"]["selection"]["primary"] = serde_json::Value::Null;
        value["state"]["selection"]["lastTouched"] = serde_json::Value::Null;

        let loaded = CatalogFile::from_json(&value.to_string()).unwrap();
        assert_eq!(loaded.state.selection.primary, None);
        assert_eq!(loaded.path, "x");
    }

    #[test]
    fn test_missing_state_is_error() {
        let result = CatalogFile::from_json(r#"{"path":"x"}"#);
        assert!(matches!(result, Err(DbError::Migration(_))));
    }

    #[test]
    fn test_garbage_is_json_error() {
        assert!(matches!(CatalogFile::from_json("{"), Err(DbError::Json(_))));
    }
}
