//! Application session: the stores plus the backend, wired explicitly

use crate::backend::BackendApi;
use crate::backend_mirror::BackendMirror;
use crate::command::{Command, CommandContext};
use crate::error::{AppError, Result};
use crate::store::CatalogStore;
use crate::transient::TransientStore;
use ipc_proto::{BackendAction, ExportOptions, ExportRequest, ImageFile, OpenWithEntries};
use std::sync::Arc;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied,
    /// Not available in the current context; nothing changed
    Disabled,
    OpenWith(OpenWithEntries),
}

pub struct Session {
    store: CatalogStore,
    transient: TransientStore,
    mirror: BackendMirror,
    backend: Arc<dyn BackendApi>,
}

impl Session {
    pub fn new(backend: Arc<dyn BackendApi>, store: CatalogStore, transient: TransientStore) -> Self {
        Self {
            store,
            transient,
            mirror: BackendMirror::default(),
            backend,
        }
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn transient(&self) -> &TransientStore {
        &self.transient
    }

    pub fn mirror(&self) -> &BackendMirror {
        &self.mirror
    }

    pub fn mirror_mut(&mut self) -> &mut BackendMirror {
        &mut self.mirror
    }

    pub fn context(&self) -> CommandContext<'_> {
        CommandContext {
            store: &self.store,
            transient: self.transient.state(),
            backend: self.mirror.state(),
        }
    }

    pub fn is_enabled(&self, command: &Command) -> bool {
        command.is_enabled(&self.context())
    }

    /// Single entry point for every mutation triggered by the user
    pub async fn apply(&mut self, command: Command) -> Result<Outcome> {
        if !self.is_enabled(&command) {
            tracing::debug!("Command {} cannot be executed in current context", command.name());
            return Ok(Outcome::Disabled);
        }
        tracing::debug!("Applying {}", command.name());

        let column_count = self.transient.state().column_count;
        let store = &mut self.store;

        match command {
            Command::SelectPrimary { uid } => store.select_primary(uid.as_deref()),
            Command::SelectPrimaryPreservingAdditional { uid } => {
                store.select_primary_preserving_additional_if_possible(&uid)
            }
            Command::ToggleAdditionalSelection { uid } => store.toggle_additional_selection(&uid),
            Command::SelectRange { uid } => store.select_range(&uid)?,
            Command::SelectAll => store.select_all(),
            Command::DeselectAll => store.deselect_all(),
            Command::MovePrimarySelection { direction } => {
                store.move_primary_selection(direction, column_count)
            }
            Command::MoveAdditionalSelection { direction } => {
                store.move_additional_selection(direction, column_count)
            }

            Command::MoveWithinCurrentList { uids, dest_index } => {
                store.move_within_current_list(&uids, dest_index)
            }
            Command::Sort { attribute, order } => store.sort(attribute, order),

            Command::LabelSelection { label } => store.label_selection(label),
            Command::RateSelection { rating } => store.rate_selection(rating),
            Command::RotateLeft => store.rotate_left(),
            Command::RotateRight => store.rotate_right(),
            Command::RotateToDefault => store.rotate_to_default(),
            Command::FlipHorizontally => store.flip_horizontally(),
            Command::FlipVertically => store.flip_vertically(),

            Command::ChangeLabelFilter {
                label,
                enabled,
                allow_multiple,
            } => store.change_label_filter(label, enabled, allow_multiple),
            Command::ChangeRatingFilter {
                rating,
                enabled,
                allow_multiple,
            } => store.change_rating_filter(rating, enabled, allow_multiple),
            Command::ChangePathFilter {
                path,
                enabled,
                allow_multiple,
            } => store.change_path_filter(&path, enabled, allow_multiple),

            Command::SetThumbnailSize { size } => store.set_thumbnail_size(size),
            Command::SetThumbnailRatio { ratio } => store.set_thumbnail_ratio(ratio),
            Command::AddListColumn { index, name } => store.add_list_column(index, name),
            Command::RemoveListColumn { index } => store.remove_list_column(index),
            Command::ResizeListColumn { index, width } => store.resize_list_column(index, width),
            Command::SetListRowHeight { height } => store.set_list_row_height(height),

            Command::SetImageViewerTab { tab } => self.transient.set_image_viewer_tab(tab),
            Command::SetColumnCount { count } => self.transient.set_column_count(count),
            Command::SetSidePanelWidth { width } => self.transient.set_side_panel_width(width),
            Command::ToggleInfoPanel => self.transient.toggle_info_panel(),
            Command::SetSingleImageScale { scale } => self.transient.set_single_image_scale(scale),
            Command::SetSingleImageAutoFit { auto_fit } => {
                self.transient.set_single_image_auto_fit(auto_fit)
            }

            Command::Save => {
                let path = self.mirror.state().catalog_path.clone();
                self.save_to(&path).await?;
            }
            Command::SaveAs { path } => {
                self.save_to(&path).await?;
                self.mirror.set_catalog_path(path);
            }
            Command::LoadSavedState => {
                self.load_saved_state().await?;
            }
            Command::ScanPath { path } => self.backend.scan_path(&path).await?,
            Command::ExportSelection {
                destination,
                prefix_with_index,
            } => {
                let request = ExportRequest {
                    paths: self.store.selected_paths(),
                    destination,
                    options: ExportOptions { prefix_with_index },
                };
                tracing::info!("Exporting {} files to {}", request.paths.len(), request.destination);
                self.backend.export(request).await?;
            }
            Command::MovePath { src, dest } => self.backend.move_path(&src, &dest).await?,
            Command::FetchOpenWith => {
                let uid = self
                    .store
                    .state()
                    .selection
                    .primary
                    .as_deref()
                    .ok_or_else(|| AppError::Inconsistency("no primary selection".into()))?;
                let path = self
                    .store
                    .image(uid)
                    .map(|image| image.path.clone())
                    .ok_or_else(|| AppError::UnknownImage(uid.to_string()))?;
                let entries = self.backend.open_with(&path).await?;
                return Ok(Outcome::OpenWith(entries));
            }
        }

        Ok(Outcome::Applied)
    }

    async fn save_to(&self, path: &str) -> Result<()> {
        self.backend.save(path, self.store.state()).await?;
        tracing::info!("Catalog saved to {}", path);
        Ok(())
    }

    /// Replace the catalog with the backend's saved state. Returns false
    /// when there is none.
    pub async fn load_saved_state(&mut self) -> Result<bool> {
        match self.backend.saved_state().await? {
            Some(state) => {
                self.store.replace_state(state);
                Ok(true)
            }
            None => {
                tracing::info!("Backend has no saved state");
                Ok(false)
            }
        }
    }

    /// Apply a batch of registration events atomically
    pub fn register_batch(&mut self, images: Vec<ImageFile>) {
        if images.is_empty() {
            return;
        }
        self.store.register_images(images);
    }

    /// Apply a non-batched backend action
    pub fn handle_action(&mut self, action: BackendAction) {
        match action {
            BackendAction::FileRegistered { image } | BackendAction::ThumbnailUpdated { image } => {
                self.store.register_image(image)
            }
            BackendAction::BackendStateUpdate { state } => self.mirror.merge(&state),
            other => {
                self.transient.apply_action(&other);
            }
        }
    }
}
