use axum::extract::Query;
use axum::Json;
use serde::Deserialize;

use contracts::domain::a002_local_order::aggregate::LocalOrder;

use crate::domain::a002_local_order::service;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /api/orders — страница локальных заказов, новые сверху
pub async fn list_paginated(
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<LocalOrder>>, axum::http::StatusCode> {
    match service::list_page(params.limit.unwrap_or(100), params.page.unwrap_or(1)).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list local orders: {:#}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
