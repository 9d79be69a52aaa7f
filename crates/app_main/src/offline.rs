//! Backend that only knows the local catalog file
//!
//! Used when no backend process is running: saving and loading work on the
//! filesystem, anything that needs the real backend fails cleanly.

use app_core::error::Result;
use app_core::{AppError, BackendApi};
use app_db::{CatalogFile, State};
use async_trait::async_trait;
use ipc_proto::{ExportRequest, OpenWithEntries};
use std::path::{Path, PathBuf};

pub struct OfflineBackend {
    catalog: PathBuf,
}

impl OfflineBackend {
    pub fn new(catalog: impl Into<PathBuf>) -> Self {
        Self {
            catalog: catalog.into(),
        }
    }

    fn unavailable(what: &str) -> AppError {
        AppError::Backend(format!("{} needs a running backend", what))
    }
}

#[async_trait]
impl BackendApi for OfflineBackend {
    async fn scan_path(&self, _path: &str) -> Result<()> {
        Err(Self::unavailable("scan"))
    }

    async fn move_path(&self, _src: &str, _dest: &str) -> Result<()> {
        Err(Self::unavailable("move"))
    }

    async fn export(&self, _request: ExportRequest) -> Result<()> {
        Err(Self::unavailable("export"))
    }

    async fn save(&self, path: &str, state: &State) -> Result<()> {
        CatalogFile::new(path, state.clone()).save(Path::new(path))?;
        Ok(())
    }

    async fn saved_state(&self) -> Result<Option<State>> {
        if !self.catalog.exists() {
            return Ok(None);
        }
        Ok(Some(CatalogFile::load(&self.catalog)?.state))
    }

    async fn open_with(&self, _path: &str) -> Result<OpenWithEntries> {
        Err(Self::unavailable("open-with"))
    }
}
