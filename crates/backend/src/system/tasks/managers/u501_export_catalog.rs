use async_trait::async_trait;
use contracts::shared::logger::SyncType;
use contracts::shared::settings::SyncSettings;
use contracts::shared::sync_result::SyncRunResult;
use std::sync::Arc;

use crate::system::tasks::manager::TaskManager;
use crate::system::tasks::service::TASK_EXPORT_CATALOG;
use crate::usecases::u501_export_catalog::ExportExecutor;

/// Менеджер задачи экспорта каталога (u501)
pub struct U501ExportCatalogManager {
    executor: Arc<ExportExecutor>,
}

impl U501ExportCatalogManager {
    pub fn new(executor: Arc<ExportExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl TaskManager for U501ExportCatalogManager {
    fn task_type(&self) -> &'static str {
        TASK_EXPORT_CATALOG
    }

    fn sync_type(&self) -> SyncType {
        SyncType::Export
    }

    async fn run(&self, settings: &SyncSettings) -> SyncRunResult {
        self.executor.run(settings).await
    }
}
