use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Направление синхронизации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncType {
    Export,
    OrderImport,
    StatusExport,
}

impl SyncType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncType::Export => "export",
            SyncType::OrderImport => "order-import",
            SyncType::StatusExport => "status-export",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "export" => Some(SyncType::Export),
            "order-import" => Some(SyncType::OrderImport),
            "status-export" => Some(SyncType::StatusExport),
            _ => None,
        }
    }
}

/// Кто запустил синхронизацию
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    Manual,
    Automatic,
}

impl SyncTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTrigger::Manual => "manual",
            SyncTrigger::Automatic => "automatic",
        }
    }
}

/// Итоговый статус запуска
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Error,
    Warning,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Error => "error",
            RunStatus::Warning => "warning",
        }
    }
}

/// Запись журнала запусков синхронизации
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub id: i64,
    /// Unix timestamp запуска
    pub timestamp: i64,
    pub sync_type: SyncType,
    pub trigger: SyncTrigger,
    pub status: RunStatus,
    pub message: String,
    /// Структурированные детали (счётчики, имя файла и т.п.)
    pub details: BTreeMap<String, String>,
}
