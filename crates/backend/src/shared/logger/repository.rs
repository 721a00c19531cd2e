use anyhow::Result;
use chrono::Utc;
use contracts::shared::logger::{RunStatus, SyncLogEntry, SyncTrigger, SyncType};
use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect, Set};
use std::collections::BTreeMap;

use crate::shared::data::db::get_connection;

/// Ёмкость журнала: записи сверх лимита молча отбрасываются с хвоста
pub const MAX_LOG_ENTRIES: u64 = 100;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sync_run_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timestamp: i64,
    pub sync_type: String,
    pub trigger_kind: String,
    pub status: String,
    pub message: String,
    pub details_json: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for SyncLogEntry {
    fn from(m: Model) -> Self {
        let details: BTreeMap<String, String> =
            serde_json::from_str(&m.details_json).unwrap_or_default();
        SyncLogEntry {
            id: m.id,
            timestamp: m.timestamp,
            sync_type: SyncType::parse(&m.sync_type).unwrap_or(SyncType::Export),
            trigger: match m.trigger_kind.as_str() {
                "manual" => SyncTrigger::Manual,
                _ => SyncTrigger::Automatic,
            },
            status: match m.status.as_str() {
                "error" => RunStatus::Error,
                "warning" => RunStatus::Warning,
                _ => RunStatus::Success,
            },
            message: m.message,
            details,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Добавить запись о запуске и обрезать журнал до MAX_LOG_ENTRIES
/// (новые записи сверху, старые молча выпадают).
pub async fn append_run_log(
    sync_type: SyncType,
    trigger: SyncTrigger,
    status: RunStatus,
    message: &str,
    details: &BTreeMap<String, String>,
) -> Result<()> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        timestamp: Set(Utc::now().timestamp()),
        sync_type: Set(sync_type.as_str().to_string()),
        trigger_kind: Set(trigger.as_str().to_string()),
        status: Set(status.as_str().to_string()),
        message: Set(message.to_string()),
        details_json: Set(serde_json::to_string(details)?),
    };
    active.insert(conn()).await?;

    trim_to_capacity().await?;
    Ok(())
}

async fn trim_to_capacity() -> Result<()> {
    let keep_ids: Vec<i64> = Entity::find()
        .select_only()
        .column(Column::Id)
        .order_by_desc(Column::Id)
        .limit(MAX_LOG_ENTRIES)
        .into_tuple()
        .all(conn())
        .await?;

    if keep_ids.len() < MAX_LOG_ENTRIES as usize {
        return Ok(());
    }

    let oldest_kept = *keep_ids.last().unwrap_or(&0);
    Entity::delete_many()
        .filter(Column::Id.lt(oldest_kept))
        .exec(conn())
        .await?;
    Ok(())
}

/// Все записи журнала, новые сверху
pub async fn list_all() -> Result<Vec<SyncLogEntry>> {
    let entries: Vec<SyncLogEntry> = Entity::find()
        .order_by_desc(Column::Id)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(entries)
}

/// Очистить журнал целиком
pub async fn clear_all() -> Result<()> {
    Entity::delete_many().exec(conn()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::init_test_database;

    #[tokio::test]
    async fn test_log_trimmed_to_capacity() {
        init_test_database().await;

        let details = BTreeMap::new();
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            append_run_log(
                SyncType::Export,
                SyncTrigger::Automatic,
                RunStatus::Success,
                &format!("run {}", i),
                &details,
            )
            .await
            .unwrap();
        }

        let entries = list_all().await.unwrap();
        assert_eq!(entries.len(), MAX_LOG_ENTRIES as usize);
        // Новые сверху, старейшие пять записей выпали
        assert_eq!(entries[0].message, format!("run {}", MAX_LOG_ENTRIES + 4));
        assert_eq!(entries.last().unwrap().message, "run 5");
    }
}
