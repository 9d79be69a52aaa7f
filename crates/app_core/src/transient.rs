//! Session-only view state and long operation tracking (never persisted)

use ipc_proto::{BackendAction, LogMessage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Active tab of the image viewer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageViewerTab {
    #[default]
    Thumbnails,
    Media,
    List,
}

/// Zoom options of the single image viewer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SingleImageSettings {
    pub auto_fit: bool,
    pub scale: f64,
}

impl Default for SingleImageSettings {
    fn default() -> Self {
        Self {
            auto_fit: true,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LongOperationState {
    InProgress,
    Success,
    Error,
}

/// A backend task (export, scan) reported over the event stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongOperation {
    pub state: LongOperationState,
    pub status: String,
    pub progress: f64,
    /// Append-only
    pub log: Vec<LogMessage>,
}

impl LongOperation {
    fn started() -> Self {
        Self {
            state: LongOperationState::InProgress,
            status: String::new(),
            progress: 0.0,
            log: Vec::new(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state != LongOperationState::InProgress
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransientState {
    pub image_viewer_tab: ImageViewerTab,
    /// Grid width of the thumbnail view, at least 1
    pub column_count: usize,
    pub side_panel_width: u32,
    pub info_panel_visible: bool,
    pub single_image: SingleImageSettings,
    pub long_operations: BTreeMap<String, LongOperation>,
    pub archived_operations: BTreeMap<String, LongOperation>,
}

impl Default for TransientState {
    fn default() -> Self {
        Self {
            image_viewer_tab: ImageViewerTab::Thumbnails,
            column_count: 1,
            side_panel_width: 250,
            info_panel_visible: false,
            single_image: SingleImageSettings::default(),
            long_operations: BTreeMap::new(),
            archived_operations: BTreeMap::new(),
        }
    }
}

/// Owner of [`TransientState`]
#[derive(Debug, Default)]
pub struct TransientStore {
    state: TransientState,
}

impl TransientStore {
    pub fn new(state: TransientState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &TransientState {
        &self.state
    }

    pub fn set_image_viewer_tab(&mut self, tab: ImageViewerTab) {
        self.state.image_viewer_tab = tab;
    }

    pub fn set_column_count(&mut self, n: usize) {
        self.state.column_count = n.max(1);
    }

    pub fn set_side_panel_width(&mut self, width: u32) {
        self.state.side_panel_width = width;
    }

    pub fn set_info_panel_visible(&mut self, visible: bool) {
        self.state.info_panel_visible = visible;
    }

    pub fn toggle_info_panel(&mut self) {
        self.state.info_panel_visible = !self.state.info_panel_visible;
    }

    pub fn set_single_image_auto_fit(&mut self, auto_fit: bool) {
        self.state.single_image.auto_fit = auto_fit;
    }

    /// Manual zoom; turns auto-fit off
    pub fn set_single_image_scale(&mut self, scale: f64) {
        self.state.single_image.scale = scale.clamp(0.05, 32.0);
        self.state.single_image.auto_fit = false;
    }

    /// Apply a long operation event. Returns false for other actions.
    pub fn apply_action(&mut self, action: &BackendAction) -> bool {
        let Some(loid) = action.operation_id() else {
            return false;
        };
        match action {
            BackendAction::LongOperationStart { .. } => {
                let ops = &mut self.state.long_operations;
                if ops.insert(loid.to_string(), LongOperation::started()).is_some() {
                    tracing::warn!("Long operation {} restarted", loid);
                }
                tracing::debug!("Long operation {} started", loid);
            }
            BackendAction::LongOperationStatus { status, .. } => {
                if let Some(op) = self.live(loid) {
                    op.status = status.status.clone();
                    op.progress = status.progress;
                }
            }
            BackendAction::LongOperationLog { log, .. } => {
                if let Some(op) = self.live(loid) {
                    op.log.push(log.clone());
                }
            }
            BackendAction::LongOperationSuccess { .. } => {
                if let Some(op) = self.live(loid) {
                    op.state = LongOperationState::Success;
                    op.progress = 1.0;
                }
                self.archive(loid);
            }
            BackendAction::LongOperationError { message, .. } => {
                if let Some(op) = self.live(loid) {
                    op.state = LongOperationState::Error;
                    op.status = message.clone();
                }
                self.archive(loid);
            }
            _ => return false,
        }
        true
    }

    fn live(&mut self, loid: &str) -> Option<&mut LongOperation> {
        let op = self.state.long_operations.get_mut(loid);
        if op.is_none() {
            tracing::warn!("Event for unknown long operation {}", loid);
        }
        op
    }

    fn archive(&mut self, loid: &str) {
        if let Some(op) = self.state.long_operations.remove(loid) {
            tracing::info!("Long operation {} finished: {:?}", loid, op.state);
            self.state.archived_operations.insert(loid.to_string(), op);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipc_proto::{LogKind, OperationStatus};

    fn start(loid: &str) -> BackendAction {
        BackendAction::LongOperationStart { loid: loid.into() }
    }

    #[test]
    fn test_column_count_at_least_one() {
        let mut store = TransientStore::default();
        store.set_column_count(0);
        assert_eq!(store.state().column_count, 1);
        store.set_column_count(6);
        assert_eq!(store.state().column_count, 6);
    }

    #[test]
    fn test_operation_lifecycle_success() {
        let mut store = TransientStore::default();
        assert!(store.apply_action(&start("op")));
        store.apply_action(&BackendAction::LongOperationStatus {
            loid: "op".into(),
            status: OperationStatus {
                status: "Copying".into(),
                progress: 0.5,
            },
        });
        store.apply_action(&BackendAction::LongOperationLog {
            loid: "op".into(),
            log: LogMessage {
                kind: LogKind::Warning,
                message: "skipped".into(),
            },
        });

        let op = &store.state().long_operations["op"];
        assert_eq!(op.state, LongOperationState::InProgress);
        assert_eq!(op.status, "Copying");
        assert_eq!(op.log.len(), 1);

        store.apply_action(&BackendAction::LongOperationSuccess { loid: "op".into() });
        assert!(store.state().long_operations.is_empty());

        let done = &store.state().archived_operations["op"];
        assert_eq!(done.state, LongOperationState::Success);
        assert!(done.is_finished());
        assert_eq!(done.log.len(), 1);
    }

    #[test]
    fn test_operation_error_archived_with_message() {
        let mut store = TransientStore::default();
        store.apply_action(&start("op"));
        store.apply_action(&BackendAction::LongOperationError {
            loid: "op".into(),
            message: "disk full".into(),
        });

        let failed = &store.state().archived_operations["op"];
        assert_eq!(failed.state, LongOperationState::Error);
        assert_eq!(failed.status, "disk full");
    }

    #[test]
    fn test_unknown_operation_ignored() {
        let mut store = TransientStore::default();
        assert!(store.apply_action(&BackendAction::LongOperationSuccess { loid: "nope".into() }));
        assert!(store.state().long_operations.is_empty());
        assert!(store.state().archived_operations.is_empty());
    }

    #[test]
    fn test_other_actions_not_handled() {
        let mut store = TransientStore::default();
        let action = BackendAction::BackendStateUpdate {
            state: Default::default(),
        };
        assert!(!store.apply_action(&action));
    }

    #[test]
    fn test_scale_disables_auto_fit() {
        let mut store = TransientStore::default();
        store.set_single_image_scale(100.0);
        assert!(!store.state().single_image.auto_fit);
        assert_eq!(store.state().single_image.scale, 32.0);
    }
}
