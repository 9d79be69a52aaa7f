//! Historical catalog schemas, kept only to read old catalogs

use crate::model::{uid_set, FilterSettings, ImageList, ImageMetadata, Selection, ThumbnailSettings};
use ipc_proto::{ExifData, FileColorTag, ImageFilePreview, ImageUid, Size};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub mod v1 {
    use super::*;

    /// Version 1 kept a single preview per image
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ImageFile {
        pub path: String,
        pub uid: ImageUid,
        pub size: Size,
        #[serde(default)]
        pub preview_size: Option<Size>,
        #[serde(default)]
        pub preview_timestamp: Option<i64>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct State {
        pub version: u32,
        pub filter_settings: FilterSettings,
        pub filters_invariant: String,
        pub thumbnail_settings: ThumbnailSettings,
        pub selection: Selection,
        pub images: BTreeMap<ImageUid, ImageFile>,
        pub metadata: BTreeMap<ImageUid, ImageMetadata>,
        pub lists: BTreeMap<String, ImageList>,
        /// Values were the directory itself; only keys matter
        pub paths: BTreeMap<String, serde_json::Value>,
    }
}

pub mod v2 {
    use super::*;

    /// Version 2 added file attributes but no location
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ImageFile {
        pub path: String,
        pub uid: ImageUid,
        pub size: Size,
        pub previews: Vec<ImageFilePreview>,
        pub file_size: u64,
        pub file_ctime: f64,
        pub file_mtime: f64,
        pub file_color_tag: FileColorTag,
        #[serde(default)]
        pub icc_profile_description: String,
        #[serde(default)]
        pub mime_type: String,
        #[serde(default)]
        pub exif_data: ExifData,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct State {
        pub version: u32,
        pub filter_settings: FilterSettings,
        pub filters_invariant: String,
        pub thumbnail_settings: ThumbnailSettings,
        pub selection: Selection,
        pub images: BTreeMap<ImageUid, ImageFile>,
        pub metadata: BTreeMap<ImageUid, ImageMetadata>,
        pub lists: BTreeMap<String, ImageList>,
        #[serde(with = "uid_set")]
        pub paths: BTreeSet<String>,
    }
}
