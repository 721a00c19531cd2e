use async_trait::async_trait;
use contracts::shared::logger::SyncType;
use contracts::shared::settings::SyncSettings;
use contracts::shared::sync_result::SyncRunResult;

/// Трейт для менеджеров запланированных задач синхронизации.
/// Каждый тип синхронизации имеет свою реализацию этого трейта.
#[async_trait]
pub trait TaskManager: Send + Sync {
    /// Тип задачи, который обрабатывает этот менеджер
    fn task_type(&self) -> &'static str;

    /// Тип синхронизации для журнала и статистики
    fn sync_type(&self) -> SyncType;

    /// Выполнить задачу. Ошибки сворачиваются в неуспешный
    /// SyncRunResult внутри executor'а — менеджер не паникует и не
    /// возвращает Err.
    async fn run(&self, settings: &SyncSettings) -> SyncRunResult;
}
