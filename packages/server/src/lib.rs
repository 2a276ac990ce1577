#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime dashboard.
//!
//! Every request recomputes the dashboard from the current incident table
//! and the requested filters. The incident table comes from the most
//! recent upload, or from the configured default CSV when nothing has been
//! uploaded. Parsed tables and boundaries are memoized in [`cache`] keyed
//! by their source; nothing else is kept between requests.

pub mod cache;
pub mod config;
mod handlers;
pub mod interactive;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use crime_dash_ingest::{IngestError, IngestReport, Ingested};
use crime_dash_neighborhood_models::BoundaryRecord;
use crime_dash_server_models::ApiSource;
use thiserror::Error;

use crate::cache::{LoadCache, SourceKey};
use crate::config::{ConfigError, DashboardConfig};

/// Shown when there is no upload and no default incident file.
pub const NO_SOURCE_MESSAGE: &str = "Nenhum CSV encontrado. Envie um arquivo para começar.";

/// Remediation hint shown when the map cannot be built.
pub const MAP_HINT: &str =
    "Verifique se o GeoJSON tem o nome do bairro em alguma coluna (ex: nome, bairro).";

/// Errors that end a request.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The incident file could not be read.
    #[error("Falha ao ler o CSV: {0}")]
    Ingest(#[from] IngestError),

    /// No upload and no default incident file.
    #[error("Nenhum CSV encontrado. Envie um arquivo para começar.")]
    NoSource,

    /// Every row was dropped during cleanup.
    #[error("{}", .report.diagnostic())]
    EmptyTable {
        /// The report of the ingestion that came up empty.
        report: IngestReport,
    },
}

/// The most recently uploaded incident file.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Content key of `bytes`.
    pub key: SourceKey,
    /// Name the client gave the file.
    pub file_name: String,
    /// The raw CSV, kept so it can be re-parsed after invalidation.
    pub bytes: Arc<[u8]>,
}

/// The incident table a request works on.
#[derive(Debug, Clone)]
pub struct CurrentIncidents {
    /// The parsed table and its ingest report.
    pub ingested: Arc<Ingested>,
    /// Upload file name or configured path.
    pub name: String,
    /// Whether the table came from an upload.
    pub uploaded: bool,
}

impl CurrentIncidents {
    /// Describes the source for API responses.
    #[must_use]
    pub fn source(&self) -> ApiSource {
        let report = &self.ingested.report;
        ApiSource {
            name: self.name.clone(),
            uploaded: self.uploaded,
            rows_read: report.rows_read as u64,
            rows_dropped: report.rows_dropped as u64,
            date_strategy: report.date_strategy.as_str().to_string(),
        }
    }
}

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    /// Loaded configuration.
    pub config: DashboardConfig,
    /// Parsed incident tables.
    pub incidents: LoadCache<Ingested>,
    /// Parsed boundary files.
    pub boundaries: LoadCache<Vec<BoundaryRecord>>,
    upload: Mutex<Option<Upload>>,
}

impl AppState {
    /// Creates state with empty caches and no upload.
    #[must_use]
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            incidents: LoadCache::new(),
            boundaries: LoadCache::new(),
            upload: Mutex::new(None),
        }
    }

    fn upload_slot(&self) -> MutexGuard<'_, Option<Upload>> {
        self.upload.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The active upload, if any.
    #[must_use]
    pub fn upload(&self) -> Option<Upload> {
        self.upload_slot().clone()
    }

    /// Replaces the active upload and returns its content key and parsed
    /// table.
    ///
    /// The previous upload's cache entry is invalidated.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Ingest`] if the bytes are not a readable CSV.
    /// The previous upload stays active in that case.
    pub fn set_upload(
        &self,
        file_name: String,
        bytes: Vec<u8>,
    ) -> Result<(SourceKey, CurrentIncidents), ServerError> {
        let key = SourceKey::for_content(&bytes);
        let bytes: Arc<[u8]> = Arc::from(bytes);
        let ingested = self
            .incidents
            .get_or_try_load(&key, || crime_dash_ingest::ingest_bytes(&bytes))?;

        let previous = self.upload_slot().replace(Upload {
            key: key.clone(),
            file_name: file_name.clone(),
            bytes,
        });
        if let Some(previous) = previous.filter(|p| p.key != key) {
            self.incidents.invalidate(&previous.key);
        }

        log::info!(
            "Upload {file_name} accepted: {} of {} row(s) kept",
            ingested.report.rows_kept(),
            ingested.report.rows_read
        );

        Ok((
            key,
            CurrentIncidents {
                ingested,
                name: file_name,
                uploaded: true,
            },
        ))
    }

    /// Drops the active upload, falling back to the default file. Returns
    /// whether an upload was active.
    pub fn clear_upload(&self) -> bool {
        let previous = self.upload_slot().take();
        if let Some(previous) = &previous {
            self.incidents.invalidate(&previous.key);
        }
        previous.is_some()
    }

    /// Resolves the incident table for this request.
    ///
    /// # Errors
    ///
    /// * [`ServerError::NoSource`] if there is no upload and no default file
    /// * [`ServerError::Ingest`] if the file cannot be read
    /// * [`ServerError::EmptyTable`] if cleanup dropped every row
    pub fn current_incidents(&self) -> Result<CurrentIncidents, ServerError> {
        let current = if let Some(upload) = self.upload() {
            let ingested = self.incidents.get_or_try_load(&upload.key, || {
                crime_dash_ingest::ingest_bytes(&upload.bytes)
            })?;
            CurrentIncidents {
                ingested,
                name: upload.file_name,
                uploaded: true,
            }
        } else {
            let path = self.config.data.incidents_csv.as_path();
            if !path.is_file() {
                return Err(ServerError::NoSource);
            }
            let ingested = self
                .incidents
                .get_or_try_load(&SourceKey::for_path(path), || {
                    crime_dash_ingest::ingest_file(path)
                })?;
            CurrentIncidents {
                ingested,
                name: path.display().to_string(),
                uploaded: false,
            }
        };

        if current.ingested.table.is_empty() {
            return Err(ServerError::EmptyTable {
                report: current.ingested.report.clone(),
            });
        }

        Ok(current)
    }

    /// Loads the configured boundaries, or `None` when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns the load error if the file exists but cannot be parsed.
    pub fn boundaries(
        &self,
    ) -> Result<Option<Arc<Vec<BoundaryRecord>>>, crime_dash_neighborhood::NeighborhoodError> {
        let path: &Path = &self.config.data.boundaries_geojson;
        if !path.is_file() {
            return Ok(None);
        }
        self.boundaries
            .get_or_try_load(&SourceKey::for_path(path), || {
                crime_dash_neighborhood::boundaries::load(path).map(Option::unwrap_or_default)
            })
            .map(Some)
    }
}

/// Registers the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/options", web::get().to(handlers::options))
            .route("/dashboard", web::get().to(handlers::dashboard))
            .route("/map", web::get().to(handlers::map))
            .route("/export", web::get().to(handlers::export))
            .route("/upload", web::post().to(handlers::upload))
            .route("/upload", web::delete().to(handlers::reset_upload)),
    );
}

/// Starts the crime dashboard API server.
///
/// This is a regular async function; the caller provides the runtime (e.g.
/// via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: DashboardConfig) -> std::io::Result<()> {
    let bind_addr = config.server.bind_addr.clone();
    let port = config.server.port;
    let static_dir = config.server.static_dir.clone();
    let max_upload = config.server.max_upload_bytes;

    if !config.data.incidents_csv.is_file() {
        log::warn!(
            "Default incident file {} not found; waiting for an upload",
            config.data.incidents_csv.display()
        );
    }

    let state = web::Data::new(AppState::new(config));

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        let app = App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_upload))
            .configure(configure_api);

        // Serve frontend static files (production)
        if static_dir.is_dir() {
            app.service(Files::new("/", &static_dir).index_file("index.html"))
        } else {
            app
        }
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
