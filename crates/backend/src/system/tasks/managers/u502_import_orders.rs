use async_trait::async_trait;
use contracts::shared::logger::SyncType;
use contracts::shared::settings::SyncSettings;
use contracts::shared::sync_result::SyncRunResult;
use contracts::usecases::u502_import_orders::request::ImportOrdersRequest;
use std::sync::Arc;

use crate::system::tasks::manager::TaskManager;
use crate::system::tasks::service::TASK_IMPORT_ORDERS;
use crate::usecases::u502_import_orders::ImportOrdersExecutor;

/// Менеджер задачи импорта заказов (u502). Диапазон дат при
/// автоматическом запуске берётся из настроек.
pub struct U502ImportOrdersManager {
    executor: Arc<ImportOrdersExecutor>,
}

impl U502ImportOrdersManager {
    pub fn new(executor: Arc<ImportOrdersExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl TaskManager for U502ImportOrdersManager {
    fn task_type(&self) -> &'static str {
        TASK_IMPORT_ORDERS
    }

    fn sync_type(&self) -> SyncType {
        SyncType::OrderImport
    }

    async fn run(&self, settings: &SyncSettings) -> SyncRunResult {
        self.executor
            .run(settings, &ImportOrdersRequest::default())
            .await
    }
}
