//! Dashboard configuration.
//!
//! The default `dashboard.toml` is embedded at compile time. A different
//! file can be named with `CRIME_DASH_CONFIG`; individual settings are then
//! overridden by `CRIME_DASH_CSV`, `CRIME_DASH_GEOJSON`, `BIND_ADDR`, and
//! `PORT`.

use std::path::{Path, PathBuf};

use crime_dash_analytics_models::ViewLimits;
use crime_dash_neighborhood_models::MapSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The default configuration, embedded at compile time.
pub const DEFAULT_CONFIG: &str = include_str!("../dashboard.toml");

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "CRIME_DASH_CONFIG";

/// Errors loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`DashboardConfig`].
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override has an invalid value.
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Input file locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Default incident CSV, used until a file is uploaded.
    pub incidents_csv: PathBuf,
    /// Neighborhood boundaries `GeoJSON`. The map is disabled when absent.
    pub boundaries_geojson: PathBuf,
    /// File name offered for the filtered export.
    pub export_file_name: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            incidents_csv: PathBuf::from("data/crimes.csv"),
            boundaries_geojson: PathBuf::from("data/bairros_curitiba.geojson"),
            export_file_name: crime_dash_ingest::csv_file::EXPORT_FILE_NAME.to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to listen on.
    pub bind_addr: String,
    /// TCP port to listen on.
    pub port: u16,
    /// Frontend build served at `/`.
    pub static_dir: PathBuf,
    /// Largest accepted upload body.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            static_dir: PathBuf::from("app/dist"),
            max_upload_bytes: 200 * 1024 * 1024,
        }
    }
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// `[data]`
    pub data: DataConfig,
    /// `[server]`
    pub server: ServerConfig,
    /// `[map]`
    pub map: MapSettings,
    /// `[charts]`
    pub charts: ViewLimits,
}

impl DashboardConfig {
    /// Parses a config from TOML text. Missing sections and keys take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the text is not a valid config.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(text)?)
    }

    /// Reads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Loads the config named by `CRIME_DASH_CONFIG` (or the embedded
    /// default) and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is invalid or an override
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                log::info!("Loading config from {path}");
                Self::from_file(Path::new(&path))?
            }
            Err(_) => Self::parse(DEFAULT_CONFIG)?,
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Applies overrides from a variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `PORT` is not a port number.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(csv) = lookup("CRIME_DASH_CSV") {
            self.data.incidents_csv = PathBuf::from(csv);
        }
        if let Some(geojson) = lookup("CRIME_DASH_GEOJSON") {
            self.data.boundaries_geojson = PathBuf::from(geojson);
        }
        if let Some(bind_addr) = lookup("BIND_ADDR") {
            self.server.bind_addr = bind_addr;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name: "PORT", value: port })?;
        }
        Ok(())
    }
}
