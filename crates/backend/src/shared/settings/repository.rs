use anyhow::Result;
use chrono::Utc;
use contracts::shared::settings::SyncSettings;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::data::db::get_connection;

const SETTINGS_KEY: &str = "sync_settings";

/// Прочитать настройки синхронизации. Отсутствующая запись или
/// нечитаемый JSON дают настройки по умолчанию — сервис не должен
/// падать из-за повреждённой записи.
pub async fn load() -> Result<SyncSettings> {
    let conn = get_connection();

    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value_json FROM plugin_settings WHERE settings_key = ?",
            vec![SETTINGS_KEY.into()],
        ))
        .await?;

    let Some(row) = row else {
        return Ok(SyncSettings::default());
    };

    let value_json: String = row.try_get("", "value_json")?;
    match serde_json::from_str::<SyncSettings>(&value_json) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            tracing::warn!("Stored sync settings are unreadable, using defaults: {}", e);
            Ok(SyncSettings::default())
        }
    }
}

/// Сохранить настройки целиком (одна запись key-value)
pub async fn save(settings: &SyncSettings) -> Result<()> {
    let conn = get_connection();
    let value_json = serde_json::to_string(settings)?;
    let updated_at = Utc::now().to_rfc3339();

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        r#"
        INSERT INTO plugin_settings (settings_key, value_json, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(settings_key) DO UPDATE SET
            value_json = excluded.value_json,
            updated_at = excluded.updated_at
        "#,
        vec![SETTINGS_KEY.into(), value_json.into(), updated_at.into()],
    ))
    .await?;

    Ok(())
}
