//! Единая отчётность по завершённому запуску: журнал, статистика и
//! самовосстановление расписания. Вызывается каждым executor'ом через
//! обёртки ручного запуска и планировщика.

use contracts::shared::logger::{SyncTrigger, SyncType};
use contracts::shared::settings::SyncSettings;
use contracts::shared::sync_result::SyncRunResult;
use std::collections::BTreeMap;

use crate::shared::logger::repository as log_repository;
use crate::shared::sync_stats::repository as stats_repository;

/// Зафиксировать итог запуска. Сбои самой отчётности не влияют на
/// результат синхронизации — только предупреждение в трейсинг.
pub async fn report_run(
    sync_type: SyncType,
    trigger: SyncTrigger,
    settings: &SyncSettings,
    result: &SyncRunResult,
) {
    if settings.log_enabled {
        let details: BTreeMap<String, String> = result
            .counts
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();

        if let Err(e) = log_repository::append_run_log(
            sync_type,
            trigger,
            result.run_status(),
            &result.message,
            &details,
        )
        .await
        {
            tracing::warn!("Failed to append sync run log: {:#}", e);
        }
    }

    if let Err(e) = stats_repository::record_run(sync_type, result.processed_items()).await {
        tracing::warn!("Failed to record sync stats: {:#}", e);
    }

    // Расписание этого типа проверяется после каждого запуска: если
    // запись потерялась или зависла в прошлом, она пересоздаётся.
    if let Err(e) = crate::system::tasks::service::heal_schedule(sync_type, settings).await {
        tracing::warn!("Schedule self-heal for {} failed: {:#}", sync_type.as_str(), e);
    }
}
