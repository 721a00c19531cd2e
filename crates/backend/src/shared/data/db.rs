use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/nalda-sync.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Database connection already initialized"))?;
    tracing::info!("Database initialized at {}", db_file);
    Ok(())
}

/// Инициализация общей тестовой базы. Соединение глобальное на процесс,
/// поэтому повторный вызов из другого теста просто переиспользует его.
#[cfg(test)]
pub async fn init_test_database() {
    let path = std::env::temp_dir().join(format!("nalda-sync-test-{}.db", std::process::id()));
    let _ = initialize_database(path.to_str()).await;
    assert!(DB_CONN.get().is_some(), "test database failed to initialize");
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection is not initialized")
}

/// Минимальный bootstrap схемы: все таблицы создаются идемпотентно
/// при старте (CREATE TABLE IF NOT EXISTS).
async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS plugin_settings (
            settings_key TEXT PRIMARY KEY NOT NULL,
            value_json TEXT NOT NULL,
            updated_at TEXT
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS a001_catalog_item (
            id TEXT PRIMARY KEY NOT NULL,
            parent_id TEXT,
            sku TEXT NOT NULL,
            gtin TEXT,
            status TEXT NOT NULL DEFAULT 'published',
            stock INTEGER,
            item_json TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS a002_local_order (
            id TEXT PRIMARY KEY NOT NULL,
            remote_order_id TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL,
            last_sync_at TEXT,
            order_json TEXT NOT NULL,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS sync_run_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp INTEGER NOT NULL,
            sync_type TEXT NOT NULL,
            trigger_kind TEXT NOT NULL,
            status TEXT NOT NULL,
            message TEXT NOT NULL,
            details_json TEXT NOT NULL DEFAULT '{}'
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS sync_stats (
            sync_type TEXT PRIMARY KEY NOT NULL,
            last_run_at TEXT,
            total_runs INTEGER NOT NULL DEFAULT 0,
            last_run_items INTEGER NOT NULL DEFAULT 0
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS scheduled_task (
            task_type TEXT PRIMARY KEY NOT NULL,
            is_enabled INTEGER NOT NULL DEFAULT 0,
            schedule_interval TEXT NOT NULL,
            next_run_at TEXT,
            last_run_at TEXT,
            last_run_status TEXT,
            created_at TEXT,
            updated_at TEXT
        );
        "#,
    ];

    for sql in statements {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await?;
    }

    Ok(())
}
