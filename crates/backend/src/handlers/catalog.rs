use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use contracts::domain::a001_catalog_item::aggregate::{CatalogItem, ItemStatus};
use contracts::domain::common::AggregateId;

use crate::domain::a001_catalog_item::service;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
}

/// GET /api/catalog-items — страница корневых товаров
pub async fn list_paginated(
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<CatalogItem>>, axum::http::StatusCode> {
    let statuses: Vec<ItemStatus> = params
        .status
        .as_deref()
        .and_then(ItemStatus::parse)
        .into_iter()
        .collect();

    match service::list_page(
        &statuses,
        params.limit.unwrap_or(100),
        params.page.unwrap_or(1),
    )
    .await
    {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list catalog items: {:#}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/catalog-items/:id
pub async fn get_by_id(
    Path(id): Path<String>,
) -> Result<Json<CatalogItem>, axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load catalog item {}: {:#}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/catalog-items — upsert целого агрегата
pub async fn upsert(
    Json(item): Json<CatalogItem>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    match service::upsert(&item).await {
        Ok(()) => Ok(Json(json!({"id": item.id.as_string()}))),
        Err(e) => {
            tracing::error!("Failed to upsert catalog item {}: {:#}", item.sku, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
