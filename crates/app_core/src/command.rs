//! Command system for user actions
//!
//! Menus, shortcuts and scripts all produce a [`Command`]; the session
//! checks [`Command::is_enabled`] and applies it.

use crate::backend_mirror::BackendState;
use crate::selection::Direction;
use crate::sort::{SortAttribute, SortOrder};
use crate::store::CatalogStore;
use crate::transient::{ImageViewerTab, TransientState};
use app_db::{Label, ListColumnName, Rating, ThumbnailRatio};
use ipc_proto::ImageUid;
use serde::{Deserialize, Serialize};

/// Everything a command can do, with typed arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    // Selection
    SelectPrimary { uid: Option<ImageUid> },
    SelectPrimaryPreservingAdditional { uid: ImageUid },
    ToggleAdditionalSelection { uid: ImageUid },
    SelectRange { uid: ImageUid },
    SelectAll,
    DeselectAll,
    MovePrimarySelection { direction: Direction },
    MoveAdditionalSelection { direction: Direction },

    // Current list
    MoveWithinCurrentList { uids: Vec<ImageUid>, dest_index: usize },
    Sort { attribute: SortAttribute, order: SortOrder },

    // Metadata
    LabelSelection { label: Label },
    RateSelection { rating: Rating },
    RotateLeft,
    RotateRight,
    RotateToDefault,
    FlipHorizontally,
    FlipVertically,

    // Filters
    ChangeLabelFilter { label: Label, enabled: bool, allow_multiple: bool },
    ChangeRatingFilter { rating: Rating, enabled: bool, allow_multiple: bool },
    ChangePathFilter { path: String, enabled: bool, allow_multiple: bool },

    // Display
    SetThumbnailSize { size: u32 },
    SetThumbnailRatio { ratio: ThumbnailRatio },
    AddListColumn { index: usize, name: ListColumnName },
    RemoveListColumn { index: usize },
    ResizeListColumn { index: usize, width: u32 },
    SetListRowHeight { height: u32 },
    SetImageViewerTab { tab: ImageViewerTab },
    SetColumnCount { count: usize },
    SetSidePanelWidth { width: u32 },
    ToggleInfoPanel,
    SetSingleImageScale { scale: f64 },
    SetSingleImageAutoFit { auto_fit: bool },

    // Backend
    Save,
    SaveAs { path: String },
    LoadSavedState,
    ScanPath { path: String },
    ExportSelection { destination: String, prefix_with_index: bool },
    MovePath { src: String, dest: String },
    FetchOpenWith,
}

/// Read-only view used to decide whether a command is available
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    pub store: &'a CatalogStore,
    pub transient: &'a TransientState,
    pub backend: &'a BackendState,
}

impl CommandContext<'_> {
    fn has_primary(&self) -> bool {
        self.store.state().selection.primary.is_some()
    }

    fn list_tab(&self) -> bool {
        self.transient.image_viewer_tab == ImageViewerTab::List
    }
}

impl Command {
    /// Menu/shortcut availability
    pub fn is_enabled(&self, ctx: &CommandContext<'_>) -> bool {
        match self {
            Command::LabelSelection { .. }
            | Command::RateSelection { .. }
            | Command::RotateLeft
            | Command::RotateRight
            | Command::RotateToDefault
            | Command::FlipHorizontally
            | Command::FlipVertically
            | Command::ExportSelection { .. }
            | Command::FetchOpenWith => ctx.has_primary(),

            Command::Sort { .. } => !ctx.store.current_list().is_empty(),

            Command::AddListColumn { .. }
            | Command::RemoveListColumn { .. }
            | Command::ResizeListColumn { .. } => ctx.list_tab(),

            Command::Save => !ctx.backend.catalog_path.is_empty(),

            _ => true,
        }
    }

    /// Stable name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::SelectPrimary { .. } => "SelectPrimary",
            Command::SelectPrimaryPreservingAdditional { .. } => "SelectPrimaryPreservingAdditional",
            Command::ToggleAdditionalSelection { .. } => "ToggleAdditionalSelection",
            Command::SelectRange { .. } => "SelectRange",
            Command::SelectAll => "SelectAll",
            Command::DeselectAll => "DeselectAll",
            Command::MovePrimarySelection { .. } => "MovePrimarySelection",
            Command::MoveAdditionalSelection { .. } => "MoveAdditionalSelection",
            Command::MoveWithinCurrentList { .. } => "MoveWithinCurrentList",
            Command::Sort { .. } => "Sort",
            Command::LabelSelection { .. } => "LabelSelection",
            Command::RateSelection { .. } => "RateSelection",
            Command::RotateLeft => "RotateLeft",
            Command::RotateRight => "RotateRight",
            Command::RotateToDefault => "RotateToDefault",
            Command::FlipHorizontally => "FlipHorizontally",
            Command::FlipVertically => "FlipVertically",
            Command::ChangeLabelFilter { .. } => "ChangeLabelFilter",
            Command::ChangeRatingFilter { .. } => "ChangeRatingFilter",
            Command::ChangePathFilter { .. } => "ChangePathFilter",
            Command::SetThumbnailSize { .. } => "SetThumbnailSize",
            Command::SetThumbnailRatio { .. } => "SetThumbnailRatio",
            Command::AddListColumn { .. } => "AddListColumn",
            Command::RemoveListColumn { .. } => "RemoveListColumn",
            Command::ResizeListColumn { .. } => "ResizeListColumn",
            Command::SetListRowHeight { .. } => "SetListRowHeight",
            Command::SetImageViewerTab { .. } => "SetImageViewerTab",
            Command::SetColumnCount { .. } => "SetColumnCount",
            Command::SetSidePanelWidth { .. } => "SetSidePanelWidth",
            Command::ToggleInfoPanel => "ToggleInfoPanel",
            Command::SetSingleImageScale { .. } => "SetSingleImageScale",
            Command::SetSingleImageAutoFit { .. } => "SetSingleImageAutoFit",
            Command::Save => "Save",
            Command::SaveAs { .. } => "SaveAs",
            Command::LoadSavedState => "LoadSavedState",
            Command::ScanPath { .. } => "ScanPath",
            Command::ExportSelection { .. } => "ExportSelection",
            Command::MovePath { .. } => "MovePath",
            Command::FetchOpenWith => "FetchOpenWith",
        }
    }

    /// Parse one line of a command script
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend_mirror::BackendMirror;
    use crate::transient::TransientStore;
    use ipc_proto::ImageFile;

    #[test]
    fn test_parse_commands() {
        let cmd = Command::from_json(r#"{"command":"label_selection","label":3}"#).unwrap();
        assert_eq!(cmd, Command::LabelSelection { label: Label::Blue });

        let cmd = Command::from_json(r#"{"command":"sort","attribute":"ORIGIN_TIME","order":"DESC"}"#)
            .unwrap();
        assert_eq!(
            cmd,
            Command::Sort {
                attribute: SortAttribute::OriginTime,
                order: SortOrder::Desc
            }
        );

        let cmd = Command::from_json(r#"{"command":"move_primary_selection","direction":"up"}"#).unwrap();
        assert_eq!(cmd.name(), "MovePrimarySelection");

        assert!(Command::from_json(r#"{"command":"sort","attribute":"FILE_SIZE","order":"ASC"}"#).is_err());
        assert!(Command::from_json(r#"{"command":"rate_selection","rating":6}"#).is_err());
    }

    #[test]
    fn test_enabled_predicates() {
        let mut store = CatalogStore::default();
        let mut transient = TransientStore::default();
        let mut mirror = BackendMirror::default();

        let sort = Command::Sort {
            attribute: SortAttribute::FileName,
            order: SortOrder::Asc,
        };
        let add_column = Command::AddListColumn {
            index: 0,
            name: ListColumnName::City,
        };

        {
            let ctx = CommandContext {
                store: &store,
                transient: transient.state(),
                backend: mirror.state(),
            };
            assert!(!Command::RotateLeft.is_enabled(&ctx));
            assert!(!sort.is_enabled(&ctx));
            assert!(!add_column.is_enabled(&ctx));
            assert!(!Command::Save.is_enabled(&ctx));
            assert!(Command::SelectAll.is_enabled(&ctx));
        }

        store.register_image(ImageFile::new("a", "/p/a.jpg"));
        store.select_primary(Some("a"));
        transient.set_image_viewer_tab(ImageViewerTab::List);
        mirror.set_catalog_path("/c.json");

        let ctx = CommandContext {
            store: &store,
            transient: transient.state(),
            backend: mirror.state(),
        };
        assert!(Command::RotateLeft.is_enabled(&ctx));
        assert!(sort.is_enabled(&ctx));
        assert!(add_column.is_enabled(&ctx));
        assert!(Command::Save.is_enabled(&ctx));
    }
}
