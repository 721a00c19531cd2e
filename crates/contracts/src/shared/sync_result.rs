use crate::shared::logger::RunStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Единый результат запуска синхронизации. Потребляется журналом,
/// статистикой и ручными вызовами одинаково; отдельного статуса
/// "частичный успех" нет — пропуски попадают в счётчики.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRunResult {
    pub success: bool,
    pub message: String,
    pub counts: BTreeMap<String, i64>,
}

impl SyncRunResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            counts: BTreeMap::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            counts: BTreeMap::new(),
        }
    }

    pub fn with_count(mut self, key: &str, value: i64) -> Self {
        self.counts.insert(key.to_string(), value);
        self
    }

    pub fn count(&self, key: &str) -> i64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Статус для журнала: ошибка при неуспехе, предупреждение при
    /// пропущенных записях, иначе успех.
    pub fn run_status(&self) -> RunStatus {
        if !self.success {
            RunStatus::Error
        } else if self.count("skipped") > 0 {
            RunStatus::Warning
        } else {
            RunStatus::Success
        }
    }

    /// Записей обработано (для статистики последнего запуска)
    pub fn processed_items(&self) -> i64 {
        self.count("product_count") + self.count("created") + self.count("updated")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_mapping() {
        assert_eq!(SyncRunResult::ok("ok").run_status(), RunStatus::Success);
        assert_eq!(SyncRunResult::error("no").run_status(), RunStatus::Error);
        assert_eq!(
            SyncRunResult::ok("ok").with_count("skipped", 2).run_status(),
            RunStatus::Warning
        );
        // Нулевой счётчик пропусков — это всё ещё успех
        assert_eq!(
            SyncRunResult::ok("ok").with_count("skipped", 0).run_status(),
            RunStatus::Success
        );
    }
}
