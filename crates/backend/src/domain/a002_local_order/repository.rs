use anyhow::Result;
use chrono::Utc;
use contracts::domain::a002_local_order::aggregate::LocalOrder;
use contracts::domain::common::AggregateId;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_local_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub remote_order_id: String,
    pub status: String,
    pub last_sync_at: Option<chrono::DateTime<chrono::Utc>>,
    pub order_json: String,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LocalOrder {
    fn from(m: Model) -> Self {
        serde_json::from_str(&m.order_json).unwrap_or_else(|_| {
            panic!(
                "Failed to deserialize order_json for remote order: {}",
                m.remote_order_id
            )
        })
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_active_model(order: &LocalOrder) -> Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(order.id.as_string()),
        remote_order_id: Set(order.remote_order_id.clone()),
        status: Set(order.status.as_str().to_string()),
        last_sync_at: Set(order.last_sync_at),
        order_json: Set(serde_json::to_string(order)?),
        is_deleted: Set(order.metadata.is_deleted),
        created_at: Set(Some(order.metadata.created_at)),
        updated_at: Set(Some(order.metadata.updated_at)),
        version: Set(order.metadata.version),
    })
}

/// Поиск по внешней ссылке. Уникальность remote_order_id держит
/// инвариант "не больше одного локального заказа на заказ маркетплейса".
pub async fn get_by_remote_order_id(remote_order_id: &str) -> Result<Option<LocalOrder>> {
    let result = Entity::find()
        .filter(Column::RemoteOrderId.eq(remote_order_id))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(order: &LocalOrder) -> Result<()> {
    let active = to_active_model(order)?;
    active.insert(conn()).await?;
    Ok(())
}

pub async fn update(order: &LocalOrder) -> Result<()> {
    let mut active = to_active_model(order)?;
    active.updated_at = Set(Some(Utc::now()));
    active.version = Set(order.metadata.version + 1);
    active.update(conn()).await?;
    Ok(())
}

/// Страница заказов с внешней ссылкой (для статус-экспорта), новые
/// сверху. Тот же контракт пагинации, что и у каталога: последняя
/// страница короче `limit`.
pub async fn list_page(limit: u64, page: u64) -> Result<Vec<LocalOrder>> {
    let offset = page.saturating_sub(1) * limit;
    let orders: Vec<LocalOrder> = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::CreatedAt)
        .limit(limit)
        .offset(offset)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(orders)
}
