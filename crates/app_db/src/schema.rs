//! Catalog schema versions and migrations

use crate::legacy::{v1, v2};
use crate::model::{ListSettings, State, CURRENT_VERSION};
use crate::{DbError, Result};
use ipc_proto::{ImageFile, ImageFilePreview};

/// A catalog state in any schema version this build can read
#[derive(Debug, Clone, PartialEq)]
pub enum HistoricalState {
    V1(v1::State),
    V2(v2::State),
    V3(State),
}

impl HistoricalState {
    /// Pick the schema from the `version` field and decode
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let version = value
            .get("version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| DbError::Migration("state has no version".to_string()))?;

        Ok(match version {
            1 => HistoricalState::V1(serde_json::from_value(value)?),
            2 => HistoricalState::V2(serde_json::from_value(value)?),
            3 => HistoricalState::V3(serde_json::from_value(value)?),
            other => return Err(DbError::UnsupportedVersion(other)),
        })
    }

    pub fn version(&self) -> u32 {
        match self {
            HistoricalState::V1(_) => 1,
            HistoricalState::V2(_) => 2,
            HistoricalState::V3(_) => 3,
        }
    }
}

/// Run the migration chain until the current version is reached
pub fn migrate(mut state: HistoricalState) -> State {
    let from = state.version();

    loop {
        state = match state {
            HistoricalState::V1(s) => HistoricalState::V2(v1_to_v2(s)),
            HistoricalState::V2(s) => HistoricalState::V3(v2_to_v3(s)),
            HistoricalState::V3(s) => {
                if from < CURRENT_VERSION {
                    tracing::info!("Migrated catalog from version {} to {}", from, CURRENT_VERSION);
                }
                return s;
            }
        };
    }
}

fn v1_to_v2(old: v1::State) -> v2::State {
    let images = old
        .images
        .into_iter()
        .map(|(uid, o)| {
            let previews = match (o.preview_size, o.preview_timestamp) {
                (Some(preview_size), Some(preview_timestamp)) => vec![ImageFilePreview {
                    preview_size,
                    preview_timestamp,
                }],
                _ => Vec::new(),
            };

            let image = v2::ImageFile {
                path: o.path,
                uid: o.uid,
                size: o.size,
                previews,
                file_size: 0,
                file_ctime: 0.0,
                file_mtime: 0.0,
                file_color_tag: Default::default(),
                icc_profile_description: String::new(),
                mime_type: String::new(),
                exif_data: Default::default(),
            };
            (uid, image)
        })
        .collect();

    v2::State {
        version: 2,
        filter_settings: old.filter_settings,
        filters_invariant: old.filters_invariant,
        thumbnail_settings: old.thumbnail_settings,
        selection: old.selection,
        images,
        metadata: old.metadata,
        lists: old.lists,
        paths: old.paths.into_keys().collect(),
    }
}

fn v2_to_v3(old: v2::State) -> State {
    let images = old
        .images
        .into_iter()
        .map(|(uid, o)| {
            let image = ImageFile {
                path: o.path,
                uid: o.uid,
                size: o.size,
                previews: o.previews,
                file_size: o.file_size,
                file_ctime: o.file_ctime,
                file_mtime: o.file_mtime,
                file_color_tag: o.file_color_tag,
                icc_profile_description: o.icc_profile_description,
                mime_type: o.mime_type,
                exif_data: o.exif_data,
                country: String::new(),
                city: String::new(),
            };
            (uid, image)
        })
        .collect();

    State {
        version: 3,
        filter_settings: old.filter_settings,
        filters_invariant: old.filters_invariant,
        thumbnail_settings: old.thumbnail_settings,
        list_settings: ListSettings::default(),
        selection: old.selection,
        images,
        metadata: old.metadata,
        lists: old.lists,
        paths: old.paths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageMetadata, Label, Rating};
    use ipc_proto::Size;
    use serde_json::json;

    fn v1_document() -> serde_json::Value {
        json!({
            "version": 1,
            "filterSettings": {"selectedLabels": [1], "selectedRatings": [], "selectedPaths": []},
            "filtersInvariant": "|label:1|",
            "thumbnailSettings": {"ratio": 1, "size": 120},
            "selection": {"primary": "a", "lastTouched": "a", "additional": {}},
            "images": {
                "a": {
                    "path": "/p/a.jpg",
                    "uid": "a",
                    "size": {"width": 4, "height": 3},
                    "preview_size": {"width": 2, "height": 1},
                    "preview_timestamp": 77
                }
            },
            "metadata": {
                "a": {"rating": 2, "label": 1, "adjustments": {"rotation": 90, "horizontalFlip": true, "verticalFlip": false}}
            },
            "lists": {
                "": {"presenceMap": {"a": true}, "items": ["a"]},
                "|label:1|": {"presenceMap": {"a": true}, "items": ["a"]}
            },
            "paths": {"/p": "/p"}
        })
    }

    #[test]
    fn test_migrate_v1_to_current() {
        let historical = HistoricalState::from_value(v1_document()).unwrap();
        assert_eq!(historical.version(), 1);

        let state = migrate(historical);
        assert_eq!(state.version, CURRENT_VERSION);

        let image = &state.images["a"];
        assert_eq!(image.previews.len(), 1);
        assert_eq!(image.previews[0].preview_size, Size::new(2, 1));
        assert_eq!(image.previews[0].preview_timestamp, 77);
        assert_eq!(image.file_size, 0);
        assert_eq!(image.country, "");

        assert_eq!(state.metadata["a"].label, Label::Red);
        assert_eq!(state.metadata["a"].rating, Rating::new(2).unwrap());
        assert_eq!(state.list_settings, ListSettings::default());
        assert!(state.paths.contains("/p"));
        assert_eq!(state.selection.primary.as_deref(), Some("a"));
        assert_eq!(state.lists["|label:1|"].items, vec!["a".to_string()]);
    }

    #[test]
    fn test_migrated_matches_direct_construction() {
        let state = migrate(HistoricalState::from_value(v1_document()).unwrap());

        let mut direct = State {
            filters_invariant: "|label:1|".into(),
            ..State::default()
        };
        direct.filter_settings.selected_labels = vec![Label::Red];
        direct.thumbnail_settings.ratio = crate::model::ThumbnailRatio::Normal;
        direct.thumbnail_settings.size = 120;

        assert_eq!(state.filter_settings, direct.filter_settings);
        assert_eq!(state.filters_invariant, direct.filters_invariant);
        assert_eq!(state.thumbnail_settings, direct.thumbnail_settings);
        assert_eq!(state.list_settings, direct.list_settings);
    }

    #[test]
    fn test_v1_without_preview_has_no_previews() {
        let mut doc = v1_document();
        doc["images"]["a"].as_object_mut().unwrap().remove("preview_size");

        let state = migrate(HistoricalState::from_value(doc).unwrap());
        assert!(state.images["a"].previews.is_empty());
    }

    #[test]
    fn test_current_version_passes_through() {
        let mut state = State::default();
        state.metadata.insert("x".into(), ImageMetadata::default());

        let value = serde_json::to_value(&state).unwrap();
        let migrated = migrate(HistoricalState::from_value(value).unwrap());
        assert_eq!(migrated, state);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let result = HistoricalState::from_value(json!({"version": 99}));
        assert!(matches!(result, Err(DbError::UnsupportedVersion(99))));

        let result = HistoricalState::from_value(json!({}));
        assert!(matches!(result, Err(DbError::Migration(_))));
    }
}
