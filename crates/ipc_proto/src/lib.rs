//! Protocol definitions for UI <-> backend communication
//!
//! This crate defines the data structures shared with the backend process:
//! - Image file records produced by the scanner
//! - Tagged actions pushed over the event stream
//! - Request bodies for the request/response API
//! - Endpoint description (address, shared secret header)

mod action;
mod image;
mod request;

pub use action::{BackendAction, LogKind, LogMessage, OperationStatus};
pub use image::{dir_name, ExifData, FileColorTag, ImageFile, ImageFilePreview, ImageUid, Size};
pub use request::{
    ExportOptions, ExportRequest, MovePathRequest, OpenWithEntries, OpenWithEntry,
    OpenWithRequest, ScanPathRequest,
};

use thiserror::Error;

/// Header carrying the shared secret on every request
pub const SECRET_HEADER: &str = "X-Lumen-Secret";

/// Protocol errors
#[derive(Error, Debug)]
pub enum ProtoError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unknown enum value {value} for {field}")]
    UnknownValue { field: &'static str, value: i64 },

    #[error("Connection closed: {0}")]
    Disconnected(String),
}

/// Backend API routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ScanPath,
    MovePath,
    Export,
    Save,
    SavedState,
    OpenWith,
    Events,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::ScanPath => "/scan-path",
            Route::MovePath => "/move-path",
            Route::Export => "/export",
            Route::Save => "/save",
            Route::SavedState => "/saved-state",
            Route::OpenWith => "/open-with",
            Route::Events => "/ws",
        }
    }
}

/// Where the backend listens and how to authenticate against it.
///
/// Port and secret are handed to the UI process at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub secret: String,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16, secret: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            secret: secret.into(),
        }
    }

    /// HTTP URL for a request/response route
    pub fn url(&self, route: Route) -> String {
        let scheme = if route == Route::Events { "ws" } else { "http" };
        format!("{}://{}:{}{}", scheme, self.host, self.port, route.path())
    }

    /// URL of the preview image served for `uid`
    pub fn image_url(&self, uid: &str) -> String {
        format!("http://{}:{}/images/{}", self.host, self.port, uid)
    }

    /// Headers attached to every request
    pub fn headers(&self) -> [(&'static str, &str); 1] {
        [(SECRET_HEADER, self.secret.as_str())]
    }
}
