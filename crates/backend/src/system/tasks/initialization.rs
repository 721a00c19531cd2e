use anyhow::Result;
use std::sync::Arc;

use crate::shared::marketplaces::nalda::client::NaldaApiClient;
use crate::shared::settings::service as settings_service;
use crate::usecases::{
    u501_export_catalog::ExportExecutor, u502_import_orders::ImportOrdersExecutor,
    u503_export_order_status::StatusExportExecutor,
};

use super::{
    managers::{U501ExportCatalogManager, U502ImportOrdersManager, U503ExportOrderStatusManager},
    registry::TaskManagerRegistry,
    service,
    worker::ScheduledTaskWorker,
};

/// Инициализирует реестр задач и фоновый воркер.
/// Один HTTP-клиент делится всеми executor'ами.
pub async fn initialize_scheduled_tasks(
    client: Arc<NaldaApiClient>,
) -> Result<ScheduledTaskWorker> {
    let mut registry = TaskManagerRegistry::new();

    registry.register(U501ExportCatalogManager::new(Arc::new(
        ExportExecutor::new(Arc::clone(&client)),
    )));
    registry.register(U502ImportOrdersManager::new(Arc::new(
        ImportOrdersExecutor::new(Arc::clone(&client)),
    )));
    registry.register(U503ExportOrderStatusManager::new(Arc::new(
        StatusExportExecutor::new(Arc::clone(&client)),
    )));

    // На старте расписания приводятся к текущим настройкам: потерянные
    // восстанавливаются, записи выключенных триггеров удаляются
    let settings = settings_service::get_settings().await?;
    service::heal_all_schedules(&settings).await?;

    Ok(ScheduledTaskWorker::new(Arc::new(registry), 60))
}
