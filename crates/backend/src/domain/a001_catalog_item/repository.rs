use anyhow::Result;
use chrono::Utc;
use contracts::domain::a001_catalog_item::aggregate::{CatalogItem, ItemStatus};
use contracts::domain::common::AggregateId;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_catalog_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub parent_id: Option<String>,
    pub sku: String,
    pub gtin: Option<String>,
    pub status: String,
    pub stock: Option<i32>,
    pub item_json: String,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CatalogItem {
    fn from(m: Model) -> Self {
        serde_json::from_str(&m.item_json)
            .unwrap_or_else(|_| panic!("Failed to deserialize item_json for sku: {}", m.sku))
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active_model(item: &CatalogItem) -> Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(item.id.as_string()),
        parent_id: Set(item.parent_id.map(|p| p.as_string())),
        sku: Set(item.sku.clone()),
        // В индексируемой колонке лежит уже разрешённый идентификатор
        // (нативное поле, метаданные или цифровой SKU), чтобы поиск по
        // GTIN находил и товары без нативного поля
        gtin: Set(item.resolve_gtin()),
        status: Set(item.status.as_str().to_string()),
        stock: Set(item.stock),
        item_json: Set(serde_json::to_string(item)?),
        is_deleted: Set(item.metadata.is_deleted),
        created_at: Set(Some(item.metadata.created_at)),
        updated_at: Set(Some(item.metadata.updated_at)),
        version: Set(item.metadata.version),
    })
}

/// Страница каталога: только корневые товары (вариации подтягиваются
/// отдельно), сортировка по SKU. `page` начинается с 1.
/// Контракт пагинации: последняя страница возвращает меньше `limit`
/// строк — флага has-more нет.
pub async fn list_page(
    statuses: &[ItemStatus],
    limit: u64,
    page: u64,
) -> Result<Vec<CatalogItem>> {
    let mut query = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::ParentId.is_null());

    if !statuses.is_empty() {
        let values: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        query = query.filter(Column::Status.is_in(values));
    }

    let offset = page.saturating_sub(1) * limit;
    let items: Vec<CatalogItem> = query
        .order_by_asc(Column::Sku)
        .limit(limit)
        .offset(offset)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Вариации товара, сортировка по SKU
pub async fn variants_of(parent_id: Uuid) -> Result<Vec<CatalogItem>> {
    let items: Vec<CatalogItem> = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::ParentId.eq(parent_id.to_string()))
        .order_by_asc(Column::Sku)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> Result<Option<CatalogItem>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

/// Найти товар по GTIN. Колонка `gtin` хранит разрешённый
/// идентификатор той же цепочкой, что у экспорта; запасной матч по SKU
/// покрывает записи, сохранённые до разрешения.
pub async fn find_by_gtin(gtin: &str) -> Result<Option<CatalogItem>> {
    let result = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::Gtin.eq(gtin).or(Column::Sku.eq(gtin)))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn upsert(item: &CatalogItem) -> Result<()> {
    let existing = Entity::find_by_id(item.id.as_string()).one(conn()).await?;
    let mut active = to_active_model(item)?;

    if existing.is_some() {
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(item.metadata.version + 1);
        active.update(conn()).await?;
    } else {
        active.insert(conn()).await?;
    }
    Ok(())
}

/// Обновить только остаток (версия и updated_at двигаются вместе с ним)
pub async fn update_stock(id: Uuid, stock: Option<i32>) -> Result<()> {
    let Some(model) = Entity::find_by_id(id.to_string()).one(conn()).await? else {
        anyhow::bail!("Catalog item {} not found", id);
    };

    let mut item: CatalogItem = model.clone().into();
    item.stock = stock;
    item.metadata.touch();

    let mut active = to_active_model(&item)?;
    active.version = Set(model.version + 1);
    active.update(conn()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::init_test_database;

    #[tokio::test]
    async fn test_list_page_terminates_on_short_page() {
        init_test_database().await;

        for sku in ["PAGE-A", "PAGE-B", "PAGE-C"] {
            let mut item = CatalogItem::new(sku.to_string(), format!("Item {}", sku));
            item.status = ItemStatus::Draft;
            upsert(&item).await.unwrap();
        }

        let page1 = list_page(&[ItemStatus::Draft], 2, 1).await.unwrap();
        assert_eq!(page1.len(), 2);
        assert_eq!(page1[0].sku, "PAGE-A");

        // Последняя страница короче limit, дальше пусто
        let page2 = list_page(&[ItemStatus::Draft], 2, 2).await.unwrap();
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].sku, "PAGE-C");

        let page3 = list_page(&[ItemStatus::Draft], 2, 3).await.unwrap();
        assert!(page3.is_empty());
    }
}
