use crate::shared::logger::SyncType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Агрегатные счётчики по типу синхронизации.
/// Перезаписываются целиком после каждого запуска.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStats {
    pub sync_type: SyncType,
    pub last_run_at: Option<DateTime<Utc>>,
    pub total_runs: i64,
    /// Количество обработанных записей в последнем запуске
    pub last_run_items: i64,
}

impl SyncStats {
    pub fn empty(sync_type: SyncType) -> Self {
        Self {
            sync_type,
            last_run_at: None,
            total_runs: 0,
            last_run_items: 0,
        }
    }
}
