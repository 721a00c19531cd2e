//! Управление расписаниями трёх триггеров синхронизации.
//! Политика: при сохранении настроек все расписания безусловно
//! пересоздаются; после каждого запуска и раз в час расписание
//! проверяется и восстанавливается, если запись потерялась.

use anyhow::Result;
use chrono::{Duration, Utc};
use contracts::shared::logger::SyncType;
use contracts::shared::schedule::ScheduleEntry;
use contracts::shared::settings::{SyncSettings, TriggerSettings};

use super::repository;

/// Первый запуск после пересоздания — примерно через две минуты,
/// чтобы не стартовать синхронизацию прямо в момент сохранения настроек
const FIRST_RUN_DELAY_MINUTES: i64 = 2;

pub const TASK_EXPORT_CATALOG: &str = "u501_export_catalog";
pub const TASK_IMPORT_ORDERS: &str = "u502_import_orders";
pub const TASK_EXPORT_ORDER_STATUS: &str = "u503_export_order_status";

pub fn task_type_for(sync_type: SyncType) -> &'static str {
    match sync_type {
        SyncType::Export => TASK_EXPORT_CATALOG,
        SyncType::OrderImport => TASK_IMPORT_ORDERS,
        SyncType::StatusExport => TASK_EXPORT_ORDER_STATUS,
    }
}

fn trigger_for(sync_type: SyncType, settings: &SyncSettings) -> &TriggerSettings {
    match sync_type {
        SyncType::Export => &settings.export,
        SyncType::OrderImport => &settings.order_import,
        SyncType::StatusExport => &settings.status_export,
    }
}

/// Безусловно очистить и пересоздать все расписания по текущим
/// флагам настроек. Выключенные триггеры не создаются вовсе.
pub async fn recreate_all_schedules(settings: &SyncSettings) -> Result<()> {
    repository::delete_all().await?;

    let first_run = Utc::now() + Duration::minutes(FIRST_RUN_DELAY_MINUTES);
    for sync_type in [SyncType::Export, SyncType::OrderImport, SyncType::StatusExport] {
        let trigger = trigger_for(sync_type, settings);
        if !trigger.enabled {
            continue;
        }
        repository::upsert(task_type_for(sync_type), trigger.interval, first_run).await?;
    }

    tracing::info!("Sync schedules recreated from settings");
    Ok(())
}

/// Проверить расписание одного типа и восстановить его при потере.
/// Выключенный триггер, наоборот, не должен иметь записи.
pub async fn heal_schedule(sync_type: SyncType, settings: &SyncSettings) -> Result<()> {
    let task_type = task_type_for(sync_type);
    let trigger = trigger_for(sync_type, settings);
    let existing = repository::get(task_type).await?;

    if !trigger.enabled {
        if existing.is_some() {
            repository::delete(task_type).await?;
        }
        return Ok(());
    }

    let needs_recreate = match &existing {
        None => true,
        Some(entry) => match entry.next_run_at {
            // Запись без следующего запуска или застрявшая в прошлом
            // глубже одного интервала считается потерянной
            None => true,
            Some(next_run) => {
                next_run < Utc::now() - Duration::minutes(entry.interval.minutes())
            }
        },
    };

    if needs_recreate {
        tracing::warn!("Schedule for {} missing or stale, recreating", task_type);
        let first_run = Utc::now() + Duration::minutes(FIRST_RUN_DELAY_MINUTES);
        repository::upsert(task_type, trigger.interval, first_run).await?;
    }
    Ok(())
}

/// Профилактическая проверка всех расписаний (вызывается воркером
/// не чаще раза в час)
pub async fn heal_all_schedules(settings: &SyncSettings) -> Result<()> {
    for sync_type in [SyncType::Export, SyncType::OrderImport, SyncType::StatusExport] {
        heal_schedule(sync_type, settings).await?;
    }
    Ok(())
}

/// Расписания для API
pub async fn list_schedules() -> Result<Vec<ScheduleEntry>> {
    repository::list_all().await
}

/// Зафиксировать завершённый запуск: следующий запуск через интервал
pub async fn mark_run_finished(task_type: &str, last_run_status: &str) -> Result<()> {
    let Some(entry) = repository::get(task_type).await? else {
        return Ok(());
    };
    let next_run = Utc::now() + Duration::minutes(entry.interval.minutes());
    repository::mark_run(task_type, last_run_status, next_run).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::init_test_database;
    use contracts::shared::settings::ScheduleInterval;

    #[tokio::test]
    async fn test_recreate_drops_disabled_triggers() {
        init_test_database().await;

        // Запись выключенного теперь триггера должна исчезнуть
        repository::upsert(TASK_IMPORT_ORDERS, ScheduleInterval::Hourly, Utc::now())
            .await
            .unwrap();

        let mut settings = SyncSettings::default();
        settings.export.enabled = true;
        settings.export.interval = ScheduleInterval::Daily;
        settings.order_import.enabled = false;
        settings.status_export.enabled = false;

        recreate_all_schedules(&settings).await.unwrap();

        let entries = repository::list_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].task_type, TASK_EXPORT_CATALOG);
        assert_eq!(entries[0].interval, ScheduleInterval::Daily);
        assert!(entries[0].next_run_at.unwrap() > Utc::now());
    }
}
