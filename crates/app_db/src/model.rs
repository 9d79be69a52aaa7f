//! Current catalog schema (version 3)

use crate::DbError;
use ipc_proto::{ImageFile, ImageUid};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Version written by this build
pub const CURRENT_VERSION: u32 = 3;

/// Color label assigned by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Label {
    #[default]
    None = 0,
    Red = 1,
    Green = 2,
    Blue = 3,
    Brown = 4,
    Magenta = 5,
    Orange = 6,
    Yellow = 7,
    Cyan = 8,
    Gray = 9,
}

impl Label {
    pub const ALL: [Label; 10] = [
        Label::None,
        Label::Red,
        Label::Green,
        Label::Blue,
        Label::Brown,
        Label::Magenta,
        Label::Orange,
        Label::Yellow,
        Label::Cyan,
        Label::Gray,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }
}

impl TryFrom<i64> for Label {
    type Error = DbError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(|idx| Label::ALL.get(idx).copied())
            .ok_or_else(|| DbError::InvalidValue {
                field: "label",
                value: value.to_string(),
            })
    }
}

impl From<Label> for i64 {
    fn from(label: Label) -> Self {
        label as i64
    }
}

/// Star rating, 0 to 5
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Rating> {
        (0..=Self::MAX).map(Rating)
    }
}

impl TryFrom<i64> for Rating {
    type Error = DbError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Rating::new)
            .ok_or_else(|| DbError::InvalidValue {
                field: "rating",
                value: value.to_string(),
            })
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        rating.0 as i64
    }
}

/// Clockwise rotation in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rotation {
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

impl TryFrom<i64> for Rotation {
    type Error = DbError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            _ => Err(DbError::InvalidValue {
                field: "rotation",
                value: value.to_string(),
            }),
        }
    }
}

impl From<Rotation> for i64 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees() as i64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAdjustments {
    pub rotation: Rotation,
    pub horizontal_flip: bool,
    pub vertical_flip: bool,
}

/// User-editable metadata, one per image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub rating: Rating,
    pub label: Label,
    pub adjustments: ImageAdjustments,
}

/// Materialized view of the images matching one filter invariant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageList {
    #[serde(with = "uid_set")]
    pub presence_map: HashSet<ImageUid>,
    pub items: Vec<ImageUid>,
}

impl ImageList {
    pub fn contains(&self, uid: &str) -> bool {
        self.presence_map.contains(uid)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index_of(&self, uid: &str) -> Option<usize> {
        self.items.iter().position(|i| i == uid)
    }
}

/// Three independent facets; an empty facet matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSettings {
    pub selected_labels: Vec<Label>,
    pub selected_ratings: Vec<Rating>,
    pub selected_paths: Vec<String>,
}

impl FilterSettings {
    pub fn label(label: Label) -> Self {
        Self {
            selected_labels: vec![label],
            ..Default::default()
        }
    }

    pub fn rating(rating: Rating) -> Self {
        Self {
            selected_ratings: vec![rating],
            ..Default::default()
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            selected_paths: vec![path.into()],
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selected_labels.is_empty()
            && self.selected_ratings.is_empty()
            && self.selected_paths.is_empty()
    }
}

/// Primary plus additional selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default)]
    pub primary: Option<ImageUid>,
    #[serde(default)]
    pub last_touched: Option<ImageUid>,
    /// Never contains `primary`
    #[serde(with = "uid_set")]
    pub additional: BTreeSet<ImageUid>,
}

impl Selection {
    pub fn is_selected(&self, uid: &str) -> bool {
        self.primary.as_deref() == Some(uid) || self.additional.contains(uid)
    }

    /// Primary first, then additional in order
    pub fn all(&self) -> impl Iterator<Item = &ImageUid> {
        self.primary.iter().chain(self.additional.iter())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum ThumbnailRatio {
    Normal,
    #[default]
    Ratio4x3,
    Ratio3x4,
}

impl ThumbnailRatio {
    pub fn value(self) -> f64 {
        match self {
            ThumbnailRatio::Normal => 1.0,
            ThumbnailRatio::Ratio4x3 => 4.0 / 3.0,
            ThumbnailRatio::Ratio3x4 => 3.0 / 4.0,
        }
    }
}

impl TryFrom<f64> for ThumbnailRatio {
    type Error = DbError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        [
            ThumbnailRatio::Normal,
            ThumbnailRatio::Ratio4x3,
            ThumbnailRatio::Ratio3x4,
        ]
        .into_iter()
        .find(|r| (r.value() - value).abs() < 1e-6)
        .ok_or_else(|| DbError::InvalidValue {
            field: "thumbnail ratio",
            value: value.to_string(),
        })
    }
}

impl From<ThumbnailRatio> for f64 {
    fn from(ratio: ThumbnailRatio) -> Self {
        ratio.value()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailSettings {
    pub ratio: ThumbnailRatio,
    pub size: u32,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            ratio: ThumbnailRatio::Ratio4x3,
            size: 200,
        }
    }
}

/// Attribute shown in a list view column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListColumnName {
    Preview,
    Rating,
    Label,
    Width,
    Height,
    Dpi,
    FileName,
    FilePath,
    FileSize,
    FileCtime,
    FileMtime,
    FileColorTag,
    IccProfileDescription,
    MimeType,
    Author,
    OriginTime,
    CaptureDevice,
    Country,
    City,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListColumn {
    pub name: ListColumnName,
    pub width: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub grow: bool,
}

impl ListColumn {
    pub fn new(name: ListColumnName, width: u32) -> Self {
        Self {
            name,
            width,
            grow: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSettings {
    pub row_height: u32,
    pub columns: Vec<ListColumn>,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            row_height: 40,
            columns: vec![
                ListColumn::new(ListColumnName::Preview, 60),
                ListColumn::new(ListColumnName::FileName, 200),
                ListColumn::new(ListColumnName::FileSize, 100),
                ListColumn {
                    name: ListColumnName::FilePath,
                    width: 100,
                    grow: true,
                },
            ],
        }
    }
}

/// The whole persisted catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub version: u32,

    pub filter_settings: FilterSettings,
    pub filters_invariant: String,

    pub thumbnail_settings: ThumbnailSettings,
    pub list_settings: ListSettings,
    pub selection: Selection,

    pub images: BTreeMap<ImageUid, ImageFile>,
    pub metadata: BTreeMap<ImageUid, ImageMetadata>,
    pub lists: BTreeMap<String, ImageList>,
    #[serde(with = "uid_set")]
    pub paths: BTreeSet<String>,
}

impl Default for State {
    fn default() -> Self {
        let mut lists = BTreeMap::new();
        // The unfiltered list always exists.
        lists.insert(String::new(), ImageList::default());

        Self {
            version: CURRENT_VERSION,
            filter_settings: FilterSettings::default(),
            filters_invariant: String::new(),
            thumbnail_settings: ThumbnailSettings::default(),
            list_settings: ListSettings::default(),
            selection: Selection::default(),
            images: BTreeMap::new(),
            metadata: BTreeMap::new(),
            lists,
            paths: BTreeSet::new(),
        }
    }
}

/// Sets persisted as `{ "key": true, ... }` objects
pub(crate) mod uid_set {
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<'a, S, C>(set: &'a C, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        &'a C: IntoIterator<Item = &'a String>,
    {
        let mut keys: Vec<&String> = set.into_iter().collect();
        keys.sort();

        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in keys {
            map.serialize_entry(key, &true)?;
        }
        map.end()
    }

    /// Accepts any JSON values; only `false` marks a key as absent
    pub fn deserialize<'de, D, C>(deserializer: D) -> Result<C, D::Error>
    where
        D: Deserializer<'de>,
        C: FromIterator<String>,
    {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter(|(_, v)| v.as_bool() != Some(false))
            .map(|(k, _)| k)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_values() {
        assert_eq!(serde_json::to_value(Label::Blue).unwrap(), 3);
        assert_eq!(serde_json::from_str::<Label>("9").unwrap(), Label::Gray);
        assert!(serde_json::from_str::<Label>("10").is_err());
    }

    #[test]
    fn test_rating_range() {
        assert!(Rating::new(5).is_some());
        assert!(Rating::new(6).is_none());
        assert!(serde_json::from_str::<Rating>("-1").is_err());
    }

    #[test]
    fn test_rotation_degrees() {
        assert_eq!(serde_json::to_value(Rotation::Deg270).unwrap(), 270);
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }

    #[test]
    fn test_thumbnail_ratio_from_float() {
        let ratio: ThumbnailRatio = serde_json::from_str("1.3333333333333333").unwrap();
        assert_eq!(ratio, ThumbnailRatio::Ratio4x3);
    }

    #[test]
    fn test_presence_map_shape() {
        let mut list = ImageList::default();
        list.presence_map.insert("b".into());
        list.presence_map.insert("a".into());
        list.items = vec!["b".into(), "a".into()];

        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, r#"{"presenceMap":{"a":true,"b":true},"items":["b","a"]}"#);

        let parsed: ImageList =
            serde_json::from_str(r#"{"presenceMap":{"a":true,"b":false},"items":["a"]}"#).unwrap();
        assert!(parsed.contains("a"));
        assert!(!parsed.contains("b"));
    }

    #[test]
    fn test_default_list_settings_single_grow() {
        let settings = ListSettings::default();
        assert_eq!(settings.columns.iter().filter(|c| c.grow).count(), 1);
        assert!(settings.columns.last().unwrap().grow);
    }

    #[test]
    fn test_default_state_has_unfiltered_list() {
        let state = State::default();
        assert!(state.lists.contains_key(""));
        assert_eq!(state.version, CURRENT_VERSION);
    }
}
