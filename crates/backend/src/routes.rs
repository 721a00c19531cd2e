use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // Настройки синхронизации
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::save_settings),
        )
        .route(
            "/api/settings/validate",
            post(handlers::settings::validate_credentials),
        )
        // Каталог и заказы
        .route(
            "/api/catalog-items",
            get(handlers::catalog::list_paginated).post(handlers::catalog::upsert),
        )
        .route(
            "/api/catalog-items/:id",
            get(handlers::catalog::get_by_id),
        )
        .route("/api/orders", get(handlers::orders::list_paginated))
        // Ручные запуски синхронизаций
        .route("/api/sync/export", post(handlers::sync::trigger_export))
        .route(
            "/api/sync/import-orders",
            post(handlers::sync::trigger_import_orders),
        )
        .route(
            "/api/sync/export-status",
            post(handlers::sync::trigger_status_export),
        )
        .route("/api/sync/stats", get(handlers::sync::get_stats))
        // Расписания и журнал
        .route("/api/schedules", get(handlers::sync::get_schedules))
        .route(
            "/api/logs",
            get(handlers::logs::list_logs).delete(handlers::logs::clear_logs),
        )
}
