//! Sort comparators for list items

use crate::attributes::origin_time;
use crate::error::AppError;
use ipc_proto::{ImageFile, ImageUid};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortAttribute {
    FileName,
    OriginTime,
    FileCreationTime,
}

impl SortAttribute {
    pub fn as_str(self) -> &'static str {
        match self {
            SortAttribute::FileName => "FILE_NAME",
            SortAttribute::OriginTime => "ORIGIN_TIME",
            SortAttribute::FileCreationTime => "FILE_CREATION_TIME",
        }
    }

    /// Compare two image records by this attribute
    pub fn compare(self, a: &ImageFile, b: &ImageFile) -> Ordering {
        match self {
            SortAttribute::FileName => a.file_name().cmp(b.file_name()),
            SortAttribute::OriginTime => origin_time(a).total_cmp(&origin_time(b)),
            SortAttribute::FileCreationTime => a.file_ctime.total_cmp(&b.file_ctime),
        }
    }
}

impl FromStr for SortAttribute {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FILE_NAME" => Ok(SortAttribute::FileName),
            "ORIGIN_TIME" => Ok(SortAttribute::OriginTime),
            "FILE_CREATION_TIME" => Ok(SortAttribute::FileCreationTime),
            other => Err(AppError::InvalidValue(format!("unknown sort attribute {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Stable in-place sort of `items` by their image records.
///
/// Uids without a record compare equal to everything.
pub fn sort_items(
    items: &mut [ImageUid],
    images: &BTreeMap<ImageUid, ImageFile>,
    attribute: SortAttribute,
    order: SortOrder,
) {
    items.sort_by(|a, b| {
        let ordering = match (images.get(a), images.get(b)) {
            (Some(a), Some(b)) => attribute.compare(a, b),
            _ => Ordering::Equal,
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}
