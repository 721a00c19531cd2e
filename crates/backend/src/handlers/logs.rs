use axum::Json;

use contracts::shared::logger::SyncLogEntry;

use crate::shared::logger::repository;

/// GET /api/logs — журнал запусков, новые сверху
pub async fn list_logs() -> Result<Json<Vec<SyncLogEntry>>, axum::http::StatusCode> {
    match repository::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list sync logs: {:#}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /api/logs
pub async fn clear_logs() -> axum::http::StatusCode {
    match repository::clear_all().await {
        Ok(()) => axum::http::StatusCode::OK,
        Err(e) => {
            tracing::error!("Failed to clear sync logs: {:#}", e);
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
