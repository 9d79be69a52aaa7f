//! Lumen Core Domain Logic
//!
//! This crate contains:
//! - Filter index (per-filter image lists kept in step incrementally)
//! - Selection state machine
//! - Catalog store and transient (session-only) state
//! - Command system and session
//! - Backend boundary and event batching loop
//! - Configuration
//! - Error types

pub mod attributes;
pub mod backend;
pub mod backend_mirror;
pub mod command;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod filtering;
pub mod selection;
pub mod session;
pub mod sort;
pub mod store;
pub mod transient;

pub use attributes::{column_value, infer_attributes, origin_time, AttributeValue, InferredAttributeGroup};
pub use backend::{BackendApi, EventStream};
pub use backend_mirror::{BackendMirror, BackendState};
pub use command::{Command, CommandContext};
pub use config::{AppConfig, BackendConfig, CatalogConfig, EventsConfig, ViewConfig};
pub use error::AppError;
pub use event_loop::{LoopStats, DEFAULT_BATCH_WINDOW};
pub use filtering::filter_settings_invariant;
pub use selection::Direction;
pub use session::{Outcome, Session};
pub use sort::{SortAttribute, SortOrder};
pub use store::CatalogStore;
pub use transient::{ImageViewerTab, LongOperation, LongOperationState, TransientState, TransientStore};
