//! Ручные триггеры синхронизаций. Результат и отчётность идентичны
//! автоматическому запуску, отличается только пометка trigger=manual.

use std::sync::Arc;

use axum::Json;
use once_cell::sync::Lazy;

use contracts::shared::logger::{SyncTrigger, SyncType};
use contracts::shared::schedule::ScheduleEntry;
use contracts::shared::sync_result::SyncRunResult;
use contracts::shared::sync_stats::SyncStats;
use contracts::usecases::u502_import_orders::request::ImportOrdersRequest;

use crate::shared::marketplaces::nalda::client::NaldaApiClient;
use crate::shared::settings::service as settings_service;
use crate::shared::sync_stats::repository as stats_repository;
use crate::system::tasks::service as tasks_service;
use crate::usecases::reporting;
use crate::usecases::u501_export_catalog::ExportExecutor;
use crate::usecases::u502_import_orders::ImportOrdersExecutor;
use crate::usecases::u503_export_order_status::StatusExportExecutor;

/// Общий HTTP-клиент ручных запусков
static CLIENT: Lazy<Arc<NaldaApiClient>> = Lazy::new(|| Arc::new(NaldaApiClient::new()));

/// POST /api/sync/export
pub async fn trigger_export() -> Result<Json<SyncRunResult>, axum::http::StatusCode> {
    let settings = load_settings().await?;

    let executor = ExportExecutor::new(Arc::clone(&CLIENT));
    let result = executor.run(&settings).await;
    reporting::report_run(SyncType::Export, SyncTrigger::Manual, &settings, &result).await;
    Ok(Json(result))
}

/// POST /api/sync/import-orders
pub async fn trigger_import_orders(
    body: Option<Json<ImportOrdersRequest>>,
) -> Result<Json<SyncRunResult>, axum::http::StatusCode> {
    let settings = load_settings().await?;
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let executor = ImportOrdersExecutor::new(Arc::clone(&CLIENT));
    let result = executor.run(&settings, &request).await;
    reporting::report_run(SyncType::OrderImport, SyncTrigger::Manual, &settings, &result).await;
    Ok(Json(result))
}

/// POST /api/sync/export-status
pub async fn trigger_status_export() -> Result<Json<SyncRunResult>, axum::http::StatusCode> {
    let settings = load_settings().await?;

    let executor = StatusExportExecutor::new(Arc::clone(&CLIENT));
    let result = executor.run(&settings).await;
    reporting::report_run(SyncType::StatusExport, SyncTrigger::Manual, &settings, &result).await;
    Ok(Json(result))
}

/// GET /api/sync/stats
pub async fn get_stats() -> Result<Json<Vec<SyncStats>>, axum::http::StatusCode> {
    match stats_repository::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to load sync stats: {:#}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/schedules
pub async fn get_schedules() -> Result<Json<Vec<ScheduleEntry>>, axum::http::StatusCode> {
    match tasks_service::list_schedules().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list schedules: {:#}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn load_settings() -> Result<contracts::shared::settings::SyncSettings, axum::http::StatusCode>
{
    settings_service::get_settings().await.map_err(|e| {
        tracing::error!("Failed to load settings: {:#}", e);
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    })
}
