//! Filter invariants and incremental maintenance of per-filter image lists
//!
//! Every distinct filter combination maps to a canonical string key (the
//! "invariant"). The catalog keeps one [`ImageList`] per invariant it has
//! seen, and these functions keep `items` and `presence_map` in step.

use app_db::{FilterSettings, ImageList, ImageMetadata, Label, Rating};
use ipc_proto::{dir_name, ImageFile, ImageUid};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Lists keyed by filter invariant
pub type Lists = BTreeMap<String, ImageList>;

/// Filter facet, also the token prefix inside an invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    Label,
    Rating,
    Path,
}

impl Facet {
    pub fn prefix(self) -> &'static str {
        match self {
            Facet::Label => "label",
            Facet::Rating => "rating",
            Facet::Path => "path",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "label" => Some(Facet::Label),
            "rating" => Some(Facet::Rating),
            "path" => Some(Facet::Path),
            _ => None,
        }
    }
}

/// Canonical key of a filter: sorted, deduplicated, `|`-joined tokens
pub fn filter_settings_invariant(fs: &FilterSettings) -> String {
    let labels: BTreeSet<u8> = fs.selected_labels.iter().map(|l| l.value()).collect();
    let ratings: BTreeSet<u8> = fs.selected_ratings.iter().map(|r| r.value()).collect();
    let paths: BTreeSet<&str> = fs.selected_paths.iter().map(String::as_str).collect();

    let tokens: Vec<String> = labels
        .into_iter()
        .map(|l| format!("label:{}", l))
        .chain(ratings.into_iter().map(|r| format!("rating:{}", r)))
        .chain(paths.into_iter().map(|p| format!("path:{}", encode_uri_component(p))))
        .collect();

    if tokens.is_empty() {
        String::new()
    } else {
        format!("|{}|", tokens.join("|"))
    }
}

/// Split an invariant into `(facet, encoded value)` tokens
fn tokens(invariant: &str) -> impl Iterator<Item = Option<(Facet, &str)>> {
    invariant
        .split('|')
        .filter(|t| !t.is_empty())
        .map(|t| {
            let (prefix, value) = t.split_once(':')?;
            Some((Facet::from_prefix(prefix)?, value))
        })
}

/// Reconstruct the filter an invariant was built from
pub fn parse_invariant(invariant: &str) -> Option<FilterSettings> {
    let mut fs = FilterSettings::default();
    for token in tokens(invariant) {
        let (facet, value) = token?;
        match facet {
            Facet::Label => {
                let v: i64 = value.parse().ok()?;
                fs.selected_labels.push(Label::try_from(v).ok()?);
            }
            Facet::Rating => {
                let v: i64 = value.parse().ok()?;
                fs.selected_ratings.push(Rating::try_from(v).ok()?);
            }
            Facet::Path => fs.selected_paths.push(decode_uri_component(value)?),
        }
    }
    Some(fs)
}

/// Facets constrained by an invariant
fn facets_of(invariant: &str) -> HashSet<Facet> {
    tokens(invariant).flatten().map(|(facet, _)| facet).collect()
}

/// OR within a facet, AND across facets; empty facets match everything
pub fn is_matching_filter_settings(
    fs: &FilterSettings,
    image: &ImageFile,
    metadata: &ImageMetadata,
) -> bool {
    let matches_label = fs.selected_labels.is_empty() || fs.selected_labels.contains(&metadata.label);
    let matches_rating =
        fs.selected_ratings.is_empty() || fs.selected_ratings.contains(&metadata.rating);
    let matches_path = fs.selected_paths.is_empty()
        || fs.selected_paths.iter().any(|p| p == image.dir_name());

    matches_label && matches_rating && matches_path
}

/// Get the list for an invariant, creating an empty one on first use
pub fn list_for_invariant<'a>(lists: &'a mut Lists, invariant: &str) -> &'a mut ImageList {
    lists.entry(invariant.to_string()).or_default()
}

/// Mark `uid` present or absent, keeping `items` in step. Returns true on change.
pub fn set_presence(list: &mut ImageList, uid: &str, present: bool) -> bool {
    if present {
        if list.presence_map.contains(uid) {
            return false;
        }
        list.presence_map.insert(uid.to_string());
        list.items.push(uid.to_string());
        true
    } else {
        if !list.presence_map.remove(uid) {
            return false;
        }
        if let Some(idx) = list.index_of(uid) {
            list.items.remove(idx);
        }
        true
    }
}

/// Add or remove one image according to the filter. Returns the new membership.
pub fn update_item_in_list(
    list: &mut ImageList,
    fs: &FilterSettings,
    image: &ImageFile,
    metadata: &ImageMetadata,
) -> bool {
    let matches = is_matching_filter_settings(fs, image, metadata);
    set_presence(list, &image.uid, matches);
    matches
}

/// Make `items` agree with `presence_map`.
///
/// Surviving items keep their relative order; newly present ones are
/// appended in uid order; duplicates are dropped.
pub fn sync_list_with_presence_map(list: &mut ImageList) {
    let mut seen: HashSet<ImageUid> = HashSet::with_capacity(list.presence_map.len());
    let mut items: Vec<ImageUid> = std::mem::take(&mut list.items)
        .into_iter()
        .filter(|uid| list.presence_map.contains(uid) && seen.insert(uid.clone()))
        .collect();

    let mut added: Vec<&ImageUid> = list
        .presence_map
        .iter()
        .filter(|uid| !seen.contains(*uid))
        .collect();
    added.sort();
    items.extend(added.into_iter().cloned());

    list.items = items;
}

/// Ensure the list for `fs` exists and is current.
///
/// New lists are built by testing every image; existing ones are only
/// re-synced against their presence map.
pub fn update_lists_with_filter(
    fs: &FilterSettings,
    lists: &mut Lists,
    images: &BTreeMap<ImageUid, ImageFile>,
    metadata: &BTreeMap<ImageUid, ImageMetadata>,
) {
    let invariant = filter_settings_invariant(fs);

    if let Some(list) = lists.get_mut(&invariant) {
        sync_list_with_presence_map(list);
        return;
    }

    let list = list_for_invariant(lists, &invariant);
    for (uid, image) in images {
        if let Some(mdata) = metadata.get(uid) {
            update_item_in_list(list, fs, image, mdata);
        }
    }
    tracing::debug!("Built list {:?} with {} items", invariant, list.len());
}

/// Move `uid` into the bucket `invariant` of its facet.
///
/// `invariant` must name exactly one value of one facet (e.g. `|label:3|`).
/// The item becomes present in that list and in the unfiltered list, and
/// absent from every list over the same facet that does not accept the value.
/// Lists over other facets are untouched. Lists combining this facet with
/// others are only updated when the value rules the item out; the remaining
/// cases need the full record, see [`refresh_combined_lists`].
pub fn update_lists_presence(lists: &mut Lists, uid: &str, invariant: &str) {
    let target: Vec<(Facet, &str)> = tokens(invariant).flatten().collect();
    let [(facet, value)] = target.as_slice() else {
        tracing::warn!("Not a single-value bucket: {:?}", invariant);
        return;
    };

    for (key, list) in lists.iter_mut() {
        if key.is_empty() {
            set_presence(list, uid, true);
            continue;
        }

        let list_tokens: Vec<(Facet, &str)> = tokens(key).flatten().collect();
        if !list_tokens.iter().any(|(f, _)| f == facet) {
            continue;
        }

        let accepts = list_tokens.iter().any(|(f, v)| f == facet && v == value);
        let single_facet = list_tokens.iter().all(|(f, _)| f == facet);

        if !accepts {
            set_presence(list, uid, false);
        } else if single_facet {
            set_presence(list, uid, true);
        }
    }
}

/// Re-evaluate one image against every list whose invariant spans several facets
pub fn refresh_combined_lists(lists: &mut Lists, image: &ImageFile, metadata: &ImageMetadata) {
    for (key, list) in lists.iter_mut() {
        if facets_of(key).len() < 2 {
            continue;
        }
        match parse_invariant(key) {
            Some(fs) => {
                update_item_in_list(list, &fs, image, metadata);
            }
            None => tracing::warn!("Skipping list with malformed invariant {:?}", key),
        }
    }
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
pub fn encode_uri_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Inverse of [`encode_uri_component`]; `None` on malformed input
pub fn decode_uri_component(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = value.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
