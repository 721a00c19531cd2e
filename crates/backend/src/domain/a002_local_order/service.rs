use anyhow::Result;
use contracts::domain::a002_local_order::aggregate::LocalOrder;

use super::repository;

pub async fn find_by_remote_id(remote_order_id: &str) -> Result<Option<LocalOrder>> {
    repository::get_by_remote_order_id(remote_order_id).await
}

pub async fn create(order: &LocalOrder) -> Result<()> {
    repository::insert(order).await
}

pub async fn save(order: &LocalOrder) -> Result<()> {
    repository::update(order).await
}

pub async fn list_page(limit: u64, page: u64) -> Result<Vec<LocalOrder>> {
    repository::list_page(limit, page).await
}
