use anyhow::Result;
use chrono::Utc;
use contracts::shared::logger::SyncType;
use contracts::shared::sync_stats::SyncStats;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::data::db::get_connection;

/// Записать итог запуска: одна строка на тип синхронизации,
/// перезаписывается целиком (append здесь не нужен — история живёт в
/// журнале запусков).
pub async fn record_run(sync_type: SyncType, items_processed: i64) -> Result<()> {
    let conn = get_connection();
    let now = Utc::now().to_rfc3339();

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        r#"
        INSERT INTO sync_stats (sync_type, last_run_at, total_runs, last_run_items)
        VALUES (?, ?, 1, ?)
        ON CONFLICT(sync_type) DO UPDATE SET
            last_run_at = excluded.last_run_at,
            total_runs = sync_stats.total_runs + 1,
            last_run_items = excluded.last_run_items
        "#,
        vec![sync_type.as_str().into(), now.into(), items_processed.into()],
    ))
    .await?;

    Ok(())
}

/// Статистика по всем трём типам синхронизации (отсутствующие — пустые)
pub async fn list_all() -> Result<Vec<SyncStats>> {
    let conn = get_connection();
    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT sync_type, last_run_at, total_runs, last_run_items FROM sync_stats".to_string(),
        ))
        .await?;

    let mut stats: Vec<SyncStats> = Vec::new();
    for sync_type in [SyncType::Export, SyncType::OrderImport, SyncType::StatusExport] {
        let row = rows.iter().find(|r| {
            r.try_get::<String>("", "sync_type")
                .map(|s| s == sync_type.as_str())
                .unwrap_or(false)
        });

        match row {
            Some(row) => {
                let last_run_at: Option<String> = row.try_get("", "last_run_at")?;
                stats.push(SyncStats {
                    sync_type,
                    last_run_at: last_run_at
                        .and_then(|s| chrono::DateTime::parse_from_rfc3339(&s).ok())
                        .map(|dt| dt.with_timezone(&Utc)),
                    total_runs: row.try_get("", "total_runs")?,
                    last_run_items: row.try_get("", "last_run_items")?,
                });
            }
            None => stats.push(SyncStats::empty(sync_type)),
        }
    }

    Ok(stats)
}
