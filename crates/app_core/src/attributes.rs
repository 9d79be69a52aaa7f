//! Attributes derived from an image record for the info panel and list columns

use app_db::{ImageMetadata, ListColumnName};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use ipc_proto::ImageFile;
use serde::Serialize;
use std::fmt;

/// EXIF timestamp layout
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Float(f64),
    DateTime(DateTime<Utc>),
    Missing,
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "{}", s),
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::DateTime(t) => write!(f, "{}", t.to_rfc3339()),
            AttributeValue::Missing => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferredAttribute {
    pub name: &'static str,
    pub title: &'static str,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferredAttributeGroup {
    pub name: &'static str,
    pub title: &'static str,
    pub attributes: Vec<InferredAttribute>,
}

fn attr(name: &'static str, title: &'static str, value: AttributeValue) -> InferredAttribute {
    InferredAttribute { name, title, value }
}

fn text(value: &str) -> AttributeValue {
    AttributeValue::String(value.to_string())
}

fn opt_text(value: Option<&str>) -> AttributeValue {
    value.map_or(AttributeValue::Missing, text)
}

/// Milliseconds since epoch to a UTC timestamp
fn millis(value: f64) -> AttributeValue {
    Utc.timestamp_millis_opt(value as i64)
        .single()
        .map_or(AttributeValue::Missing, AttributeValue::DateTime)
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` timestamp as UTC milliseconds
pub fn parse_exif_time(value: &str) -> Option<f64> {
    NaiveDateTime::parse_from_str(value.trim(), EXIF_DATE_FORMAT)
        .ok()
        .map(|t| t.and_utc().timestamp_millis() as f64)
}

/// Capture time in milliseconds; file creation time when EXIF has none
pub fn origin_time(image: &ImageFile) -> f64 {
    image
        .exif_data
        .date_time_original
        .as_deref()
        .and_then(parse_exif_time)
        .unwrap_or(image.file_ctime)
}

fn capture_device(image: &ImageFile) -> AttributeValue {
    let exif = &image.exif_data;
    match (exif.make.as_deref(), exif.model.as_deref()) {
        (Some(make), Some(model)) => AttributeValue::String(format!("{} {}", make, model)),
        (Some(one), None) | (None, Some(one)) => text(one),
        (None, None) => AttributeValue::Missing,
    }
}

/// Grouped attributes shown in the info panel
pub fn infer_attributes(image: &ImageFile) -> Vec<InferredAttributeGroup> {
    vec![
        InferredAttributeGroup {
            name: "file",
            title: "File",
            attributes: vec![
                attr("fileName", "File Name", text(image.file_name())),
                attr("filePath", "File Path", text(&image.path)),
                attr("fileSize", "File Size", AttributeValue::Integer(image.file_size as i64)),
                attr("fileCTime", "File Creation Time", millis(image.file_ctime)),
                attr("fileMTime", "File Modification Time", millis(image.file_mtime)),
                attr("mimeType", "Mime Type", text(&image.mime_type)),
            ],
        },
        InferredAttributeGroup {
            name: "image",
            title: "Image",
            attributes: vec![
                attr("width", "Width", AttributeValue::Integer(image.size.width.into())),
                attr("height", "Height", AttributeValue::Integer(image.size.height.into())),
                attr(
                    "iccProfileDescription",
                    "ICC Profile Description",
                    text(&image.icc_profile_description),
                ),
            ],
        },
        InferredAttributeGroup {
            name: "exif",
            title: "Exif",
            attributes: vec![
                attr("make", "Make", opt_text(image.exif_data.make.as_deref())),
                attr("model", "Model", opt_text(image.exif_data.model.as_deref())),
                attr("originTime", "Origin Time", millis(origin_time(image))),
            ],
        },
    ]
}

/// Value rendered in a list view column
pub fn column_value(
    column: ListColumnName,
    image: &ImageFile,
    metadata: &ImageMetadata,
) -> AttributeValue {
    let exif = &image.exif_data;
    match column {
        ListColumnName::Preview => AttributeValue::String(image.uid.clone()),
        ListColumnName::Rating => AttributeValue::Integer(metadata.rating.value().into()),
        ListColumnName::Label => AttributeValue::Integer(metadata.label.value().into()),
        ListColumnName::Width => AttributeValue::Integer(image.size.width.into()),
        ListColumnName::Height => AttributeValue::Integer(image.size.height.into()),
        ListColumnName::Dpi => exif
            .other
            .get("x_resolution")
            .and_then(|v| v.as_f64())
            .map_or(AttributeValue::Missing, AttributeValue::Float),
        ListColumnName::FileName => text(image.file_name()),
        ListColumnName::FilePath => text(&image.path),
        ListColumnName::FileSize => AttributeValue::Integer(image.file_size as i64),
        ListColumnName::FileCtime => millis(image.file_ctime),
        ListColumnName::FileMtime => millis(image.file_mtime),
        ListColumnName::FileColorTag => AttributeValue::Integer(i64::from(image.file_color_tag)),
        ListColumnName::IccProfileDescription => text(&image.icc_profile_description),
        ListColumnName::MimeType => text(&image.mime_type),
        ListColumnName::Author => opt_text(exif.other.get("artist").and_then(|v| v.as_str())),
        ListColumnName::OriginTime => millis(origin_time(image)),
        ListColumnName::CaptureDevice => capture_device(image),
        ListColumnName::Country => text(&image.country),
        ListColumnName::City => text(&image.city),
    }
}
