//! Image file records as produced by the backend scanner

use crate::ProtoError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque stable identifier assigned by the backend
pub type ImageUid = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A generated preview of an image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageFilePreview {
    pub preview_size: Size,
    /// Generation time, milliseconds since epoch
    pub preview_timestamp: i64,
}

/// Finder-style color tag of the file itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum FileColorTag {
    #[default]
    None,
    Gray,
    Green,
    Purple,
    Blue,
    Yellow,
    Red,
    Orange,
}

impl TryFrom<i64> for FileColorTag {
    type Error = ProtoError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => FileColorTag::None,
            1 => FileColorTag::Gray,
            2 => FileColorTag::Green,
            3 => FileColorTag::Purple,
            4 => FileColorTag::Blue,
            5 => FileColorTag::Yellow,
            6 => FileColorTag::Red,
            7 => FileColorTag::Orange,
            _ => {
                return Err(ProtoError::UnknownValue {
                    field: "file_color_tag",
                    value,
                })
            }
        })
    }
}

impl From<FileColorTag> for i64 {
    fn from(tag: FileColorTag) -> Self {
        tag as i64
    }
}

/// EXIF tags extracted by the backend.
///
/// Commonly used tags are typed; everything else is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExifData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// Original capture time, `YYYY:MM:DD HH:MM:SS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_digitized: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub f_number: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_speed_ratings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<f64>,

    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

/// A registered image file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageFile {
    pub path: String,
    pub uid: ImageUid,

    pub size: Size,
    pub previews: Vec<ImageFilePreview>,

    pub file_size: u64,
    /// Milliseconds since epoch
    pub file_ctime: f64,
    /// Milliseconds since epoch
    pub file_mtime: f64,
    pub file_color_tag: FileColorTag,

    pub icc_profile_description: String,
    pub mime_type: String,
    pub exif_data: ExifData,

    pub country: String,
    pub city: String,
}

impl ImageFile {
    /// Create a record with only identity and path set
    pub fn new(uid: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Last path component
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Parent directory, everything before the last `/`
    pub fn dir_name(&self) -> &str {
        dir_name(&self.path)
    }
}

/// Parent directory of a `/`-separated path. Empty for bare names.
pub fn dir_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}
