use anyhow::Result;
use contracts::domain::a001_catalog_item::aggregate::{CatalogItem, ItemStatus};
use uuid::Uuid;

use super::repository;

pub async fn list_page(
    statuses: &[ItemStatus],
    limit: u64,
    page: u64,
) -> Result<Vec<CatalogItem>> {
    repository::list_page(statuses, limit, page).await
}

pub async fn variants_of(parent_id: Uuid) -> Result<Vec<CatalogItem>> {
    repository::variants_of(parent_id).await
}

pub async fn get_by_id(id: Uuid) -> Result<Option<CatalogItem>> {
    repository::get_by_id(id).await
}

pub async fn upsert(item: &CatalogItem) -> Result<()> {
    repository::upsert(item).await
}

/// Сдвинуть остаток товара, найденного по GTIN, на `delta`
/// (отрицательное значение уменьшает). Товары без учёта остатков
/// пропускаются. Возвращает true, если остаток был изменён.
pub async fn adjust_stock_by_gtin(gtin: &str, delta: i32) -> Result<bool> {
    let Some(item) = repository::find_by_gtin(gtin).await? else {
        tracing::warn!("Stock adjustment skipped: no catalog item for GTIN {}", gtin);
        return Ok(false);
    };

    let Some(stock) = item.stock else {
        return Ok(false);
    };

    repository::update_stock(item.id.value(), Some(stock + delta)).await?;
    tracing::debug!(
        "Stock for GTIN {} adjusted by {}: {} -> {}",
        gtin,
        delta,
        stock,
        stock + delta
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::init_test_database;

    #[tokio::test]
    async fn test_adjust_stock_for_meta_keyed_gtin() {
        init_test_database().await;

        // GTIN задан только через метаданные, нативное поле пустое
        let mut item = CatalogItem::new("STOCK-EAN-1".to_string(), "Meta GTIN item".to_string());
        item.meta
            .insert("_ean".to_string(), "5901234123457".to_string());
        item.stock = Some(10);
        upsert(&item).await.unwrap();

        let adjusted = adjust_stock_by_gtin("5901234123457", -2).await.unwrap();
        assert!(adjusted, "item with meta-keyed GTIN must be found");

        let reloaded = get_by_id(item.id.value()).await.unwrap().unwrap();
        assert_eq!(reloaded.stock, Some(8));
    }

    #[tokio::test]
    async fn test_adjust_stock_unknown_gtin_is_noop() {
        init_test_database().await;

        let adjusted = adjust_stock_by_gtin("9999999999999", -1).await.unwrap();
        assert!(!adjusted);
    }
}
