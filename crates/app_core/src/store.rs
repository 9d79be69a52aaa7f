//! Catalog store: the persisted [`State`] and every mutation on it
//!
//! Each method applies its change fully before returning; callers read
//! the result through [`CatalogStore::state`].

use crate::error::Result;
use crate::filtering::{
    filter_settings_invariant, list_for_invariant, refresh_combined_lists,
    sync_list_with_presence_map, update_item_in_list, update_lists_presence,
    update_lists_with_filter,
};
use crate::selection::{self, Direction};
use crate::sort::{sort_items, SortAttribute, SortOrder};
use app_db::{
    FilterSettings, ImageAdjustments, ImageList, ImageMetadata, Label, ListColumn,
    ListColumnName, Rating, Rotation, Selection, State, ThumbnailRatio,
};
use ipc_proto::{ImageFile, ImageUid};
use std::collections::HashSet;
use std::sync::OnceLock;

fn empty_list() -> &'static ImageList {
    static EMPTY: OnceLock<ImageList> = OnceLock::new();
    EMPTY.get_or_init(ImageList::default)
}

fn rotated_left(rotation: Rotation) -> Rotation {
    match rotation {
        Rotation::None => Rotation::Deg270,
        Rotation::Deg90 => Rotation::None,
        Rotation::Deg180 => Rotation::Deg90,
        Rotation::Deg270 => Rotation::Deg180,
    }
}

fn rotated_right(rotation: Rotation) -> Rotation {
    match rotation {
        Rotation::None => Rotation::Deg90,
        Rotation::Deg90 => Rotation::Deg180,
        Rotation::Deg180 => Rotation::Deg270,
        Rotation::Deg270 => Rotation::None,
    }
}

/// Single-select replaces the facet; multi-select toggles within it
fn toggle_facet<T: PartialEq>(values: &mut Vec<T>, value: T, enabled: bool, allow_multiple: bool) {
    let index = values.iter().position(|v| *v == value);
    if !enabled {
        if let Some(index) = index {
            values.remove(index);
        }
    } else if !allow_multiple {
        *values = vec![value];
    } else if index.is_none() {
        values.push(value);
    }
}

/// Owner of the catalog state
#[derive(Debug, Default)]
pub struct CatalogStore {
    state: State,
}

impl CatalogStore {
    pub fn new(state: State) -> Self {
        let mut store = Self::default();
        store.replace_state(state);
        store
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn into_state(self) -> State {
        self.state
    }

    /// Swap in a freshly loaded state.
    ///
    /// The filter invariant is recomputed, every list is reconciled with
    /// its presence map and the current list is built if missing.
    pub fn replace_state(&mut self, mut state: State) {
        state.lists.entry(String::new()).or_default();
        for list in state.lists.values_mut() {
            sync_list_with_presence_map(list);
        }

        state.filters_invariant = filter_settings_invariant(&state.filter_settings);
        update_lists_with_filter(
            &state.filter_settings,
            &mut state.lists,
            &state.images,
            &state.metadata,
        );

        if let Some(primary) = &state.selection.primary {
            state.selection.additional.remove(primary);
        }

        tracing::info!(
            "Catalog state replaced: {} images, {} lists",
            state.images.len(),
            state.lists.len()
        );
        self.state = state;
    }

    /// List of the active filter
    pub fn current_list(&self) -> &ImageList {
        self.state
            .lists
            .get(&self.state.filters_invariant)
            .unwrap_or_else(|| empty_list())
    }

    pub fn image(&self, uid: &str) -> Option<&ImageFile> {
        self.state.images.get(uid)
    }

    pub fn metadata(&self, uid: &str) -> Option<&ImageMetadata> {
        self.state.metadata.get(uid)
    }

    /// Size of the list for `fs`, zero if it was never built
    pub fn num_items_matching_filter(&self, fs: &FilterSettings) -> usize {
        self.state
            .lists
            .get(&filter_settings_invariant(fs))
            .map_or(0, |list| list.presence_map.len())
    }

    /// Paths of primary and additional selection, primary first
    pub fn selected_paths(&self) -> Vec<String> {
        self.state
            .selection
            .all()
            .filter_map(|uid| self.state.images.get(uid))
            .map(|image| image.path.clone())
            .collect()
    }

    /// Selection together with the items of the current list
    fn selection_and_items(&mut self) -> (&mut Selection, &[ImageUid]) {
        let items = self
            .state
            .lists
            .get(&self.state.filters_invariant)
            .map_or(&[][..], |list| list.items.as_slice());
        (&mut self.state.selection, items)
    }

    // ===== Selection =====

    pub fn select_primary(&mut self, uid: Option<&str>) {
        selection::select_primary(&mut self.state.selection, uid);
    }

    pub fn select_primary_preserving_additional_if_possible(&mut self, uid: &str) {
        selection::select_primary_preserving_additional_if_possible(&mut self.state.selection, uid);
    }

    pub fn toggle_additional_selection(&mut self, uid: &str) {
        selection::toggle_additional_selection(&mut self.state.selection, uid);
    }

    pub fn select_range(&mut self, uid: &str) -> Result<()> {
        let (sel, items) = self.selection_and_items();
        selection::select_range(sel, items, uid)
    }

    pub fn select_all(&mut self) {
        let (sel, items) = self.selection_and_items();
        selection::select_all(sel, items);
    }

    pub fn deselect_all(&mut self) {
        self.select_primary(None);
    }

    pub fn move_primary_selection(&mut self, direction: Direction, column_count: usize) {
        let (sel, items) = self.selection_and_items();
        selection::move_primary_selection(sel, items, column_count, direction);
    }

    pub fn move_additional_selection(&mut self, direction: Direction, column_count: usize) {
        let (sel, items) = self.selection_and_items();
        selection::move_additional_selection(sel, items, column_count, direction);
    }

    // ===== Current list =====

    /// Move `uids` as one block to `dest_index`, keeping all relative orders.
    ///
    /// `dest_index` counts positions in the list before the block is taken out.
    pub fn move_within_current_list(&mut self, uids: &[ImageUid], dest_index: usize) {
        let moved: HashSet<&str> = uids.iter().map(String::as_str).collect();
        let list = list_for_invariant(&mut self.state.lists, &self.state.filters_invariant);

        let dest_index = dest_index.min(list.items.len());
        let insert_at = list.items[..dest_index]
            .iter()
            .filter(|uid| !moved.contains(uid.as_str()))
            .count();

        let (block, mut rest): (Vec<ImageUid>, Vec<ImageUid>) = std::mem::take(&mut list.items)
            .into_iter()
            .partition(|uid| moved.contains(uid.as_str()));
        rest.splice(insert_at..insert_at, block);
        list.items = rest;
    }

    pub fn sort(&mut self, attribute: SortAttribute, order: SortOrder) {
        let list = list_for_invariant(&mut self.state.lists, &self.state.filters_invariant);
        sort_items(&mut list.items, &self.state.images, attribute, order);
        tracing::debug!("Sorted {} items by {:?} {:?}", list.len(), attribute, order);
    }

    // ===== Metadata =====

    pub fn label_selection(&mut self, label: Label) {
        self.assign_to_selection(FilterSettings::label(label), |mdata| {
            std::mem::replace(&mut mdata.label, label) != label
        });
    }

    pub fn rate_selection(&mut self, rating: Rating) {
        self.assign_to_selection(FilterSettings::rating(rating), |mdata| {
            std::mem::replace(&mut mdata.rating, rating) != rating
        });
    }

    /// Write one facet value to every selected image and move the images
    /// into `bucket`. Afterwards the primary lands on the item now at its
    /// old index, or the selection is cleared when the list is empty.
    fn assign_to_selection(
        &mut self,
        bucket: FilterSettings,
        mut assign: impl FnMut(&mut ImageMetadata) -> bool,
    ) {
        let Some(primary) = self.state.selection.primary.clone() else {
            return;
        };

        let invariant = filter_settings_invariant(&bucket);
        list_for_invariant(&mut self.state.lists, &invariant);

        let primary_index = self.current_list().index_of(&primary);
        let selected: Vec<ImageUid> = self
            .state
            .selection
            .additional
            .iter()
            .cloned()
            .chain(std::iter::once(primary))
            .collect();

        for uid in &selected {
            let Some(mdata) = self.state.metadata.get_mut(uid) else {
                tracing::warn!("Selected image {} has no metadata", uid);
                continue;
            };
            if assign(mdata) {
                self.update_item_in_current_list(uid);
                update_lists_presence(&mut self.state.lists, uid, &invariant);
                self.refresh_combined(uid);
            }
        }
        tracing::debug!("Assigned {} to {} images", invariant, selected.len());

        let items = &self.current_list().items;
        let next = match primary_index {
            Some(index) if !items.is_empty() => Some(items[index.min(items.len() - 1)].clone()),
            _ => None,
        };
        self.select_primary(next.as_deref());
    }

    fn adjust_selection(&mut self, mut adjust: impl FnMut(&mut ImageAdjustments)) {
        let State {
            selection, metadata, ..
        } = &mut self.state;

        for uid in selection.all() {
            if let Some(mdata) = metadata.get_mut(uid) {
                adjust(&mut mdata.adjustments);
            }
        }
    }

    pub fn rotate_left(&mut self) {
        self.adjust_selection(|adj| adj.rotation = rotated_left(adj.rotation));
    }

    pub fn rotate_right(&mut self) {
        self.adjust_selection(|adj| adj.rotation = rotated_right(adj.rotation));
    }

    pub fn rotate_to_default(&mut self) {
        self.adjust_selection(|adj| adj.rotation = Rotation::None);
    }

    pub fn flip_horizontally(&mut self) {
        self.adjust_selection(|adj| adj.horizontal_flip = !adj.horizontal_flip);
    }

    pub fn flip_vertically(&mut self) {
        self.adjust_selection(|adj| adj.vertical_flip = !adj.vertical_flip);
    }

    // ===== Filters =====

    pub fn change_label_filter(&mut self, label: Label, enabled: bool, allow_multiple: bool) {
        let fs = &mut self.state.filter_settings;
        if !allow_multiple {
            fs.selected_ratings.clear();
            fs.selected_paths.clear();
        }
        toggle_facet(&mut fs.selected_labels, label, enabled, allow_multiple);
        self.apply_filter_change();
    }

    pub fn change_rating_filter(&mut self, rating: Rating, enabled: bool, allow_multiple: bool) {
        let fs = &mut self.state.filter_settings;
        if !allow_multiple {
            fs.selected_labels.clear();
            fs.selected_paths.clear();
        }
        toggle_facet(&mut fs.selected_ratings, rating, enabled, allow_multiple);
        self.apply_filter_change();
    }

    pub fn change_path_filter(&mut self, path: &str, enabled: bool, allow_multiple: bool) {
        let fs = &mut self.state.filter_settings;
        if !allow_multiple {
            fs.selected_labels.clear();
            fs.selected_ratings.clear();
        }
        toggle_facet(&mut fs.selected_paths, path.to_string(), enabled, allow_multiple);
        self.apply_filter_change();
    }

    fn apply_filter_change(&mut self) {
        let state = &mut self.state;
        state.filters_invariant = filter_settings_invariant(&state.filter_settings);
        update_lists_with_filter(
            &state.filter_settings,
            &mut state.lists,
            &state.images,
            &state.metadata,
        );
        tracing::debug!("Filter changed to {:?}", state.filters_invariant);
        self.select_primary(None);
    }

    // ===== Display settings =====

    pub fn set_thumbnail_size(&mut self, size: u32) {
        self.state.thumbnail_settings.size = size;
    }

    pub fn set_thumbnail_ratio(&mut self, ratio: ThumbnailRatio) {
        self.state.thumbnail_settings.ratio = ratio;
    }

    /// Insert a column; the last column becomes the only growing one
    pub fn add_list_column(&mut self, index: usize, name: ListColumnName) {
        let columns = &mut self.state.list_settings.columns;
        let index = index.min(columns.len());
        columns.insert(index, ListColumn::new(name, 100));

        for column in columns.iter_mut() {
            column.grow = false;
        }
        if let Some(last) = columns.last_mut() {
            last.grow = true;
        }
    }

    pub fn remove_list_column(&mut self, index: usize) {
        let columns = &mut self.state.list_settings.columns;
        if index >= columns.len() {
            tracing::warn!("No list column at {}", index);
            return;
        }

        columns.remove(index);
        if index == columns.len() {
            if let Some(last) = columns.last_mut() {
                last.grow = true;
            }
        }
    }

    pub fn resize_list_column(&mut self, index: usize, width: u32) {
        match self.state.list_settings.columns.get_mut(index) {
            Some(column) => column.width = width,
            None => tracing::warn!("No list column at {}", index),
        }
    }

    pub fn set_list_row_height(&mut self, height: u32) {
        self.state.list_settings.row_height = height;
    }

    // ===== Registration =====

    /// Upsert an image announced by the backend
    pub fn register_image(&mut self, image: ImageFile) {
        let uid = image.uid.clone();
        let dir = image.dir_name().to_string();
        let existed = self.state.images.insert(uid.clone(), image).is_some();
        self.state.paths.insert(dir.clone());

        if existed {
            self.update_item_in_current_list(&uid);
        } else {
            self.state.metadata.insert(uid.clone(), ImageMetadata::default());
            self.update_item_in_current_list(&uid);

            // Default buckets, so sidebar counts are right without a rebuild.
            for bucket in [
                FilterSettings::label(Label::None),
                FilterSettings::rating(Rating::default()),
            ] {
                self.move_to_bucket(&uid, &bucket);
            }
        }

        self.move_to_bucket(&uid, &FilterSettings::path(dir));
        self.refresh_combined(&uid);
    }

    pub fn register_images(&mut self, images: impl IntoIterator<Item = ImageFile>) {
        let mut count = 0usize;
        for image in images {
            self.register_image(image);
            count += 1;
        }
        tracing::debug!("Registered {} images", count);
    }

    fn move_to_bucket(&mut self, uid: &str, bucket: &FilterSettings) {
        let invariant = filter_settings_invariant(bucket);
        list_for_invariant(&mut self.state.lists, &invariant);
        update_lists_presence(&mut self.state.lists, uid, &invariant);
    }

    fn refresh_combined(&mut self, uid: &str) {
        let state = &mut self.state;
        if let (Some(image), Some(mdata)) = (state.images.get(uid), state.metadata.get(uid)) {
            refresh_combined_lists(&mut state.lists, image, mdata);
        }
    }

    /// Re-test one image against the active filter; drops it from the
    /// primary selection when it leaves the list
    fn update_item_in_current_list(&mut self, uid: &str) {
        let state = &mut self.state;
        let (Some(image), Some(mdata)) = (state.images.get(uid), state.metadata.get(uid)) else {
            tracing::warn!("Cannot update list for unknown image {}", uid);
            return;
        };

        let list = list_for_invariant(&mut state.lists, &state.filters_invariant);
        let present = update_item_in_list(list, &state.filter_settings, image, mdata);

        if !present && state.selection.primary.as_deref() == Some(uid) {
            self.select_primary(None);
        }
    }
}
