//! Boundary to the backend process
//!
//! The backend answers requests and pushes [`BackendAction`]s; both sides
//! are traits/streams here so the session can run against any transport.

use crate::error::Result;
use app_db::State;
use async_trait::async_trait;
use futures::stream::BoxStream;
use ipc_proto::{BackendAction, ExportRequest, OpenWithEntries, ProtoError};

/// Push stream of backend actions. Faults are items, not stream ends.
pub type EventStream = BoxStream<'static, std::result::Result<BackendAction, ProtoError>>;

/// Request/response calls into the backend
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Scan a filesystem path; results arrive as `FILE_REGISTERED` events
    async fn scan_path(&self, path: &str) -> Result<()>;

    async fn move_path(&self, src: &str, dest: &str) -> Result<()>;

    /// Long running; progress arrives as `LONG_OPERATION_*` events
    async fn export(&self, request: ExportRequest) -> Result<()>;

    /// Save the full state to a named catalog file
    async fn save(&self, path: &str, state: &State) -> Result<()>;

    /// Previously saved state, if the backend has one
    async fn saved_state(&self) -> Result<Option<State>>;

    async fn open_with(&self, path: &str) -> Result<OpenWithEntries>;
}
