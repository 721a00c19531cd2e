use axum::Json;
use serde_json::json;

use contracts::shared::settings::SyncSettings;

use crate::shared::marketplaces::nalda::client::NaldaApiClient;
use crate::shared::settings::service;

/// GET /api/settings
pub async fn get_settings() -> Result<Json<SyncSettings>, axum::http::StatusCode> {
    match service::get_settings().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to load settings: {:#}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// PUT /api/settings — сохранение пересоздаёт все расписания
pub async fn save_settings(
    Json(settings): Json<SyncSettings>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    match service::save_settings(&settings).await {
        Ok(()) => Ok(Json(json!({"saved": true}))),
        Err(e) => {
            tracing::error!("Failed to save settings: {:#}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/settings/validate — проверка учётных данных API
pub async fn validate_credentials(
    Json(settings): Json<SyncSettings>,
) -> Json<serde_json::Value> {
    let client = NaldaApiClient::new();
    match client.health_check(&settings).await {
        Ok(()) => Json(json!({"success": true, "message": "Nalda API connection OK"})),
        Err(e) => Json(json!({"success": false, "message": format!("{}", e)})),
    }
}
