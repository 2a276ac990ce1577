//! HTTP handler functions for the crime dashboard API.

use actix_web::http::header::ContentDisposition;
use actix_web::{HttpResponse, web};
use crime_dash_analytics::{DashboardView, filters};
use crime_dash_ingest::pipeline::EMPTY_TABLE_MESSAGE;
use crime_dash_neighborhood::{choropleth, join};
use crime_dash_server_models::{
    ApiDashboard, ApiError, ApiHealth, ApiMap, ApiTable, ApiUpload, FilterQueryParams,
    LegendEntry,
};
use serde::Deserialize;

use crate::{AppState, MAP_HINT, ServerError};

/// Query parameters for the upload endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    /// Original file name, for display.
    pub file_name: Option<String>,
}

/// Maps a terminal request error to its response.
fn error_response(error: &ServerError) -> HttpResponse {
    match error {
        ServerError::NoSource => HttpResponse::NotFound().json(ApiError::new(error.to_string())),
        ServerError::EmptyTable { report } => {
            let body = ApiError::new(EMPTY_TABLE_MESSAGE);
            HttpResponse::UnprocessableEntity().json(match report.missing_columns_hint() {
                Some(hint) => body.with_hint(hint),
                None => body,
            })
        }
        ServerError::Ingest(e) => {
            log::warn!("Incident file rejected: {e}");
            HttpResponse::BadRequest().json(ApiError::new(error.to_string()))
        }
        ServerError::Config(e) => {
            log::error!("Configuration error: {e}");
            HttpResponse::InternalServerError().json(ApiError::new(error.to_string()))
        }
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/options`
///
/// Returns the values available for each filter over the whole table.
pub async fn options(state: web::Data<AppState>) -> HttpResponse {
    match state.current_incidents() {
        Ok(current) => HttpResponse::Ok().json(filters::options(&current.ingested.table)),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/dashboard`
///
/// Summary, charts, and the filtered table for the requested filters.
pub async fn dashboard(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    let current = match state.current_incidents() {
        Ok(current) => current,
        Err(e) => return error_response(&e),
    };

    let view = DashboardView::build(
        &current.ingested.table,
        &params.to_selection(),
        state.config.charts,
    );

    let table = ApiTable {
        columns: view.table.columns(),
        rows: view
            .table
            .records()
            .iter()
            .map(|r| view.table.row(r))
            .collect(),
    };

    HttpResponse::Ok().json(ApiDashboard {
        source: current.source(),
        summary: view.summary,
        neighborhoods: view.neighborhoods,
        top_neighborhoods: view.top_neighborhoods,
        by_type: view.by_type,
        timeline: view.timeline,
        table,
    })
}

/// `GET /api/map`
///
/// Choropleth data for the requested filters. Boundary problems degrade
/// the map state but never fail the request.
pub async fn map(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    let current = match state.current_incidents() {
        Ok(current) => current,
        Err(e) => return error_response(&e),
    };

    let view = DashboardView::build(
        &current.ingested.table,
        &params.to_selection(),
        state.config.charts,
    );

    HttpResponse::Ok().json(map_state(&state, &view))
}

fn map_state(state: &AppState, view: &DashboardView) -> ApiMap {
    let boundaries = match state.boundaries() {
        Ok(Some(boundaries)) => boundaries,
        Ok(None) => {
            return ApiMap::Disabled {
                message: format!(
                    "GeoJSON de bairros nao encontrado em {}. Mapa desabilitado.",
                    state.config.data.boundaries_geojson.display()
                ),
            };
        }
        Err(e) => {
            log::error!("Failed to load boundaries: {e}");
            return ApiMap::Failed {
                error: format!("Erro ao gerar mapa: {e}"),
                hint: MAP_HINT.to_string(),
            };
        }
    };

    let enriched = join(&boundaries, &view.neighborhoods);
    match choropleth::feature_collection(&enriched) {
        Ok(geojson) => ApiMap::Available {
            geojson,
            settings: state.config.map.clone(),
            legend: LegendEntry::all(),
        },
        Err(e) => {
            log::error!("Failed to build map: {e}");
            ApiMap::Failed {
                error: format!("Erro ao gerar mapa: {e}"),
                hint: MAP_HINT.to_string(),
            }
        }
    }
}

/// `GET /api/export`
///
/// The filtered table as a semicolon-delimited download.
pub async fn export(
    state: web::Data<AppState>,
    params: web::Query<FilterQueryParams>,
) -> HttpResponse {
    let current = match state.current_incidents() {
        Ok(current) => current,
        Err(e) => return error_response(&e),
    };

    let filtered = filters::apply(&current.ingested.table, &params.to_selection());
    match crime_dash_ingest::export_bytes(&filtered) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition::attachment(
                state.config.data.export_file_name.clone(),
            ))
            .body(bytes),
        Err(e) => {
            log::error!("Failed to export: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Falha ao exportar o CSV"))
        }
    }
}

/// `POST /api/upload`
///
/// Replaces the active incident file with the request body.
pub async fn upload(
    state: web::Data<AppState>,
    params: web::Query<UploadParams>,
    body: web::Bytes,
) -> HttpResponse {
    let file_name = params
        .file_name
        .clone()
        .unwrap_or_else(|| "upload.csv".to_string());

    let (key, current) = match state.set_upload(file_name, body.to_vec()) {
        Ok(accepted) => accepted,
        Err(e) => return error_response(&e),
    };

    let ingested = &current.ingested;
    if ingested.table.is_empty() {
        return error_response(&ServerError::EmptyTable {
            report: ingested.report.clone(),
        });
    }

    HttpResponse::Ok().json(ApiUpload {
        source: current.source(),
        content_key: key.content_digest().unwrap_or_default().to_string(),
        rows_kept: ingested.report.rows_kept() as u64,
    })
}

/// `DELETE /api/upload`
///
/// Drops the active upload and returns to the default incident file.
pub async fn reset_upload(state: web::Data<AppState>) -> HttpResponse {
    if state.clear_upload() {
        log::info!("Upload cleared");
    }
    HttpResponse::NoContent().finish()
}
