use async_trait::async_trait;
use contracts::shared::logger::SyncType;
use contracts::shared::settings::SyncSettings;
use contracts::shared::sync_result::SyncRunResult;
use std::sync::Arc;

use crate::system::tasks::manager::TaskManager;
use crate::system::tasks::service::TASK_EXPORT_ORDER_STATUS;
use crate::usecases::u503_export_order_status::StatusExportExecutor;

/// Менеджер задачи экспорта статусов заказов (u503)
pub struct U503ExportOrderStatusManager {
    executor: Arc<StatusExportExecutor>,
}

impl U503ExportOrderStatusManager {
    pub fn new(executor: Arc<StatusExportExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl TaskManager for U503ExportOrderStatusManager {
    fn task_type(&self) -> &'static str {
        TASK_EXPORT_ORDER_STATUS
    }

    fn sync_type(&self) -> SyncType {
        SyncType::StatusExport
    }

    async fn run(&self, settings: &SyncSettings) -> SyncRunResult {
        self.executor.run(settings).await
    }
}
