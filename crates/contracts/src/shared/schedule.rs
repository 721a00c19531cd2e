use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::settings::ScheduleInterval;

/// Состояние одного расписания синхронизации (ответ API и строка БД)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Тип задачи воркера, например "u501_export_catalog"
    pub task_type: String,
    pub is_enabled: bool,
    pub interval: ScheduleInterval,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_run_at: Option<DateTime<Utc>>,
    /// Статус последнего запуска: success | error | warning
    pub last_run_status: Option<String>,
}
