use anyhow::Result;
use contracts::shared::settings::SyncSettings;

use super::repository;

pub async fn get_settings() -> Result<SyncSettings> {
    repository::load().await
}

/// Сохранить настройки и пересоздать все расписания.
/// Контракт: при каждом сохранении настроек расписания безусловно
/// очищаются и создаются заново по текущим флагам.
pub async fn save_settings(settings: &SyncSettings) -> Result<()> {
    repository::save(settings).await?;
    crate::system::tasks::service::recreate_all_schedules(settings).await?;
    Ok(())
}
