use anyhow::Result;
use chrono::{DateTime, Utc};
use contracts::shared::schedule::ScheduleEntry;
use contracts::shared::settings::ScheduleInterval;
use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "scheduled_task")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub task_type: String,
    pub is_enabled: bool,
    pub schedule_interval: String,
    pub next_run_at: Option<String>,
    pub last_run_at: Option<String>,
    pub last_run_status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn parse_ts(raw: &Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

impl From<Model> for ScheduleEntry {
    fn from(m: Model) -> Self {
        ScheduleEntry {
            task_type: m.task_type.clone(),
            is_enabled: m.is_enabled,
            interval: ScheduleInterval::parse(&m.schedule_interval)
                .unwrap_or(ScheduleInterval::Hourly),
            next_run_at: parse_ts(&m.next_run_at),
            last_run_at: parse_ts(&m.last_run_at),
            last_run_status: m.last_run_status,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

pub async fn list_all() -> Result<Vec<ScheduleEntry>> {
    let entries: Vec<ScheduleEntry> = Entity::find()
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(entries)
}

pub async fn get(task_type: &str) -> Result<Option<ScheduleEntry>> {
    let entry = Entity::find_by_id(task_type.to_string()).one(conn()).await?;
    Ok(entry.map(Into::into))
}

/// Полная очистка расписаний (перед пересозданием)
pub async fn delete_all() -> Result<()> {
    Entity::delete_many().exec(conn()).await?;
    Ok(())
}

pub async fn delete(task_type: &str) -> Result<()> {
    Entity::delete_by_id(task_type.to_string()).exec(conn()).await?;
    Ok(())
}

/// Создать расписание (upsert: существующая строка замещается)
pub async fn upsert(
    task_type: &str,
    interval: ScheduleInterval,
    next_run_at: DateTime<Utc>,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    let existing = Entity::find_by_id(task_type.to_string()).one(conn()).await?;

    let active = ActiveModel {
        task_type: Set(task_type.to_string()),
        is_enabled: Set(true),
        schedule_interval: Set(interval.as_str().to_string()),
        next_run_at: Set(Some(next_run_at.to_rfc3339())),
        last_run_at: Set(existing.as_ref().and_then(|e| e.last_run_at.clone())),
        last_run_status: Set(existing.as_ref().and_then(|e| e.last_run_status.clone())),
        created_at: Set(existing
            .as_ref()
            .and_then(|e| e.created_at.clone())
            .or_else(|| Some(now.clone()))),
        updated_at: Set(Some(now)),
    };

    if existing.is_some() {
        active.update(conn()).await?;
    } else {
        active.insert(conn()).await?;
    }
    Ok(())
}

/// Зафиксировать завершённый запуск и назначить следующий
pub async fn mark_run(
    task_type: &str,
    last_run_status: &str,
    next_run_at: DateTime<Utc>,
) -> Result<()> {
    let Some(model) = Entity::find_by_id(task_type.to_string()).one(conn()).await? else {
        // Запись могла исчезнуть между запуском и фиксацией; её
        // восстановит самовосстановление после запуска
        return Ok(());
    };

    let now = Utc::now();
    let mut active: ActiveModel = model.into();
    active.last_run_at = Set(Some(now.to_rfc3339()));
    active.last_run_status = Set(Some(last_run_status.to_string()));
    active.next_run_at = Set(Some(next_run_at.to_rfc3339()));
    active.updated_at = Set(Some(now.to_rfc3339()));
    active.update(conn()).await?;
    Ok(())
}
