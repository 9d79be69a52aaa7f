//! Application configuration

use crate::error::AppError;
use crate::transient::{ImageViewerTab, TransientState};
use app_db::State;
use directories::ProjectDirs;
use ipc_proto::Endpoint;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Number of catalogs remembered in `recent_catalogs`
pub const MAX_RECENT_CATALOGS: usize = 10;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub events: EventsConfig,
    pub catalog: CatalogConfig,
    pub view: ViewConfig,
}

/// Where the backend listens; port and secret normally come from the launcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub host: String,
    /// 0 = supplied at start
    pub port: u16,
    pub secret: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            secret: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Registration events are applied once per window
    pub batch_window_ms: u64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            batch_window_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub last_catalog: Option<PathBuf>,
    pub recent_catalogs: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub thumbnail_size: u32,
    pub side_panel_width: u32,
    pub info_panel_visible: bool,
    pub default_tab: ImageViewerTab,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            thumbnail_size: 200,
            side_panel_width: 250,
            info_panel_visible: false,
            default_tab: ImageViewerTab::Thumbnails,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            tracing::info!("Configuration loaded from {:?}", config_path);
            Ok(config)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("com", "Lumen", "Lumen")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.events.batch_window_ms == 0 {
            return Err(AppError::Config("events.batch_window_ms must be positive".into()));
        }
        if self.view.thumbnail_size == 0 {
            return Err(AppError::Config("view.thumbnail_size must be positive".into()));
        }
        Ok(())
    }

    pub fn batch_window(&self) -> Duration {
        Duration::from_millis(self.events.batch_window_ms.max(1))
    }

    /// Backend address; `None` until the launcher has supplied a port
    pub fn endpoint(&self) -> Option<Endpoint> {
        (self.backend.port != 0)
            .then(|| Endpoint::new(&self.backend.host, self.backend.port, &self.backend.secret))
    }

    /// Catalog state for a fresh catalog
    pub fn initial_state(&self) -> State {
        let mut state = State::default();
        state.thumbnail_settings.size = self.view.thumbnail_size;
        state
    }

    /// Remember `path` as the most recent catalog
    pub fn push_recent_catalog(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.catalog.recent_catalogs.retain(|p| *p != path);
        self.catalog.recent_catalogs.insert(0, path.clone());
        self.catalog.recent_catalogs.truncate(MAX_RECENT_CATALOGS);
        self.catalog.last_catalog = Some(path);
    }

    /// Initial session view state
    pub fn transient_state(&self) -> TransientState {
        TransientState {
            image_viewer_tab: self.view.default_tab,
            side_panel_width: self.view.side_panel_width,
            info_panel_visible: self.view.info_panel_visible,
            ..TransientState::default()
        }
    }
}
