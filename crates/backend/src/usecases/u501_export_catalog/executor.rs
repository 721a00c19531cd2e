//! Экспорт каталога: постраничное чтение товаров, генерация CSV во
//! временный файл и отправка на сервис загрузки Nalda.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use contracts::shared::settings::{render_filename, SyncSettings};
use contracts::shared::sync_result::SyncRunResult;
use contracts::domain::a001_catalog_item::aggregate::{CatalogItem, ItemStatus};

use crate::domain::a001_catalog_item::service as catalog_service;
use crate::shared::marketplaces::nalda::client::NaldaApiClient;

use super::field_mapper::{self, ExportRow, HEADER};

/// Байты BOM в начале файла — требование принимающей стороны
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

const CSV_TYPE_PRODUCTS: &str = "products";

pub struct ExportExecutor {
    client: Arc<NaldaApiClient>,
}

impl ExportExecutor {
    pub fn new(client: Arc<NaldaApiClient>) -> Self {
        Self { client }
    }

    /// Полный цикл экспорта. Ошибки сворачиваются в неуспешный
    /// результат — вызывающий код (ручной триггер или планировщик)
    /// обрабатывает их одинаково.
    pub async fn run(&self, settings: &SyncSettings) -> SyncRunResult {
        match self.execute(settings).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Catalog export failed: {:#}", e);
                SyncRunResult::error(format!("Export failed: {}", e))
            }
        }
    }

    async fn execute(&self, settings: &SyncSettings) -> Result<SyncRunResult> {
        let rows = collect_rows(settings).await?;

        if rows.is_empty() {
            tracing::info!("Catalog export: no eligible products, nothing to upload");
            return Ok(
                SyncRunResult::ok("No eligible products to export").with_count("product_count", 0)
            );
        }

        let file_name = render_filename(&settings.filename_pattern, Utc::now());
        let file_path = std::env::temp_dir().join(&file_name);

        let write_result = write_csv(&file_path, &rows);
        let upload_result = match write_result {
            Ok(bytes) => {
                self.client
                    .upload_csv(settings, CSV_TYPE_PRODUCTS, &file_name, bytes)
                    .await
            }
            Err(e) => Err(e),
        };

        // Временный файл удаляется независимо от исхода загрузки
        if let Err(e) = std::fs::remove_file(&file_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove temp export file {:?}: {}", file_path, e);
            }
        }

        let upload = upload_result?;
        tracing::info!(
            "Catalog export uploaded: {} rows, upload id {}",
            rows.len(),
            upload.id
        );

        Ok(
            SyncRunResult::ok(format!("Exported {} products", rows.len()))
                .with_count("product_count", rows.len() as i64),
        )
    }
}

/// Собрать строки экспорта постранично. Страница короче batch_size
/// означает конец каталога — флага has-more у репозитория нет.
async fn collect_rows(settings: &SyncSettings) -> Result<Vec<ExportRow>> {
    // Товары из корзины нужны ради флага деактивации листинга
    let statuses = [ItemStatus::Published, ItemStatus::Trashed];
    let batch_size = settings.batch_size.max(1);

    let mut rows: Vec<ExportRow> = Vec::new();
    let mut page: u64 = 1;

    loop {
        let items = catalog_service::list_page(&statuses, batch_size, page).await?;
        let page_len = items.len() as u64;

        for item in &items {
            if !field_mapper::in_sync_scope(item, settings) {
                continue;
            }
            append_item_rows(item, settings, &mut rows).await?;
        }

        if page_len < batch_size {
            break;
        }
        page += 1;
    }

    Ok(rows)
}

/// Строки для одного товара: у простого товара одна строка, у товара
/// с вариациями — по строке на вариацию с наследованием полей.
async fn append_item_rows(
    item: &CatalogItem,
    settings: &SyncSettings,
    rows: &mut Vec<ExportRow>,
) -> Result<()> {
    let variants = catalog_service::variants_of(item.id.value()).await?;

    if variants.is_empty() {
        if let Some(row) = field_mapper::map_item(item, None, settings) {
            rows.push(row);
        } else {
            tracing::debug!("Skipping item without resolvable GTIN: sku={}", item.sku);
        }
        return Ok(());
    }

    for variant in &variants {
        if let Some(row) = field_mapper::map_item(variant, Some(item), settings) {
            rows.push(row);
        } else {
            tracing::debug!(
                "Skipping variant without resolvable GTIN: sku={}",
                variant.sku
            );
        }
    }
    Ok(())
}

/// Записать CSV с BOM во временный файл и вернуть его байты
fn write_csv(path: &PathBuf, rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;
    drop(writer);

    Ok(std::fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_catalog_item::aggregate::CatalogItem;

    fn gtin_item(sku: &str) -> CatalogItem {
        let mut item = CatalogItem::new(sku.to_string(), format!("Item {}", sku));
        item.gtin = Some(format!("400638133393{}", sku.len()));
        item
    }

    #[test]
    fn test_csv_has_bom_header_and_rows() {
        let settings = SyncSettings::default();
        let rows: Vec<ExportRow> = vec![
            field_mapper::map_item(&gtin_item("A"), None, &settings).unwrap(),
            field_mapper::map_item(&gtin_item("BB"), None, &settings).unwrap(),
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let bytes = write_csv(&path, &rows).unwrap();

        assert_eq!(&bytes[..3], UTF8_BOM);
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("gtin,title,country"));
        assert_eq!(lines[0].split(',').count(), HEADER.len());
    }

    #[test]
    fn test_rows_without_gtin_are_dropped() {
        let settings = SyncSettings::default();
        // Три товара, у одного GTIN не разрешается
        let items = vec![
            gtin_item("A"),
            CatalogItem::new("NO-GTIN".to_string(), "No gtin".to_string()),
            gtin_item("C"),
        ];

        let rows: Vec<ExportRow> = items
            .iter()
            .filter_map(|i| field_mapper::map_item(i, None, &settings))
            .collect();
        assert_eq!(rows.len(), 2);
    }
}
