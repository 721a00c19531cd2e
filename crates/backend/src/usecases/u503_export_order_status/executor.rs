//! Экспорт статусов заказов обратно на маркетплейс: по строке CSV на
//! пару (заказ, позиция с GTIN), тот же контракт загрузки и уборки
//! временного файла, что у экспорта каталога.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use contracts::domain::a002_local_order::aggregate::{DeliveryState, LocalOrder, OrderStatus};
use contracts::shared::settings::{render_filename, SyncSettings};
use contracts::shared::sync_result::SyncRunResult;

use crate::domain::a002_local_order::service as order_service;
use crate::shared::marketplaces::nalda::client::NaldaApiClient;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

const CSV_TYPE_ORDER_STATUS: &str = "order_status";

pub const HEADER: [&str; 5] = ["orderId", "gtin", "state", "expectedDeliveryDate", "trackingCode"];

/// Ключи метаданных заказа, в которых ищется трекинг-код, если
/// собственное поле пусто (в порядке приоритета)
const TRACKING_META_KEYS: [&str; 5] = [
    "_tracking_number",
    "_tracking_code",
    "tracking_number",
    "tracking_code",
    "_shipment_tracking_number",
];

/// Строка статус-экспорта
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub order_id: String,
    pub gtin: String,
    pub state: DeliveryState,
    pub expected_delivery_date: String,
    pub tracking_code: String,
}

impl StatusRow {
    fn to_record(&self) -> [String; 5] {
        [
            self.order_id.clone(),
            self.gtin.clone(),
            self.state.as_str().to_string(),
            self.expected_delivery_date.clone(),
            self.tracking_code.clone(),
        ]
    }
}

/// Состояние для экспорта: сохранённое, а если оно ни разу не
/// выставлялось — производное от статуса заказа в магазине
fn effective_state(order: &LocalOrder) -> DeliveryState {
    if let Some(state) = order.delivery_state {
        return state;
    }
    match order.status {
        OrderStatus::Completed => DeliveryState::Delivered,
        OrderStatus::Cancelled => DeliveryState::Cancelled,
        OrderStatus::Refunded => DeliveryState::Returned,
        OrderStatus::Pending | OrderStatus::Processing => DeliveryState::InPreparation,
    }
}

/// Ожидаемая дата доставки в формате dd.mm.yy; при отсутствии —
/// дата создания заказа плюс три дня
fn effective_delivery_date(order: &LocalOrder) -> String {
    let date = order
        .expected_delivery_date
        .unwrap_or_else(|| (order.metadata.created_at + Duration::days(3)).date_naive());
    date.format("%d.%m.%y").to_string()
}

fn effective_tracking_code(order: &LocalOrder) -> String {
    if let Some(code) = &order.tracking_code {
        if !code.trim().is_empty() {
            return code.clone();
        }
    }
    for key in TRACKING_META_KEYS {
        if let Some(value) = order.meta.get(key) {
            if !value.trim().is_empty() {
                return value.clone();
            }
        }
    }
    String::new()
}

/// Строки одного заказа: позиции без GTIN молча пропускаются
pub fn rows_for_order(order: &LocalOrder) -> Vec<StatusRow> {
    if order.remote_order_id.trim().is_empty() {
        return Vec::new();
    }

    let state = effective_state(order);
    let date = effective_delivery_date(order);
    let tracking = effective_tracking_code(order);

    order
        .lines
        .iter()
        .filter(|line| !line.gtin.trim().is_empty())
        .map(|line| StatusRow {
            order_id: order.remote_order_id.clone(),
            gtin: line.gtin.clone(),
            state,
            expected_delivery_date: date.clone(),
            tracking_code: tracking.clone(),
        })
        .collect()
}

pub struct StatusExportExecutor {
    client: Arc<NaldaApiClient>,
}

impl StatusExportExecutor {
    pub fn new(client: Arc<NaldaApiClient>) -> Self {
        Self { client }
    }

    pub async fn run(&self, settings: &SyncSettings) -> SyncRunResult {
        match self.execute(settings).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Order status export failed: {:#}", e);
                SyncRunResult::error(format!("Status export failed: {}", e))
            }
        }
    }

    async fn execute(&self, settings: &SyncSettings) -> Result<SyncRunResult> {
        let rows = collect_rows(settings).await?;

        if rows.is_empty() {
            tracing::info!("Status export: no orders to report");
            return Ok(
                SyncRunResult::ok("No order statuses to export").with_count("product_count", 0)
            );
        }

        let file_name = render_filename(&settings.status_filename_pattern, Utc::now());
        let file_path = std::env::temp_dir().join(&file_name);

        let upload_result = match write_csv(&file_path, &rows) {
            Ok(bytes) => {
                self.client
                    .upload_csv(settings, CSV_TYPE_ORDER_STATUS, &file_name, bytes)
                    .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = std::fs::remove_file(&file_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove temp status file {:?}: {}", file_path, e);
            }
        }

        let upload = upload_result?;
        tracing::info!(
            "Order status export uploaded: {} rows, upload id {}",
            rows.len(),
            upload.id
        );

        Ok(
            SyncRunResult::ok(format!("Exported {} order status rows", rows.len()))
                .with_count("product_count", rows.len() as i64),
        )
    }
}

/// Заказы читаются постранично, конец — страница короче batch_size
async fn collect_rows(settings: &SyncSettings) -> Result<Vec<StatusRow>> {
    let batch_size = settings.batch_size.max(1);
    let mut rows: Vec<StatusRow> = Vec::new();
    let mut page: u64 = 1;

    loop {
        let orders = order_service::list_page(batch_size, page).await?;
        let page_len = orders.len() as u64;

        for order in &orders {
            rows.extend(rows_for_order(order));
        }

        if page_len < batch_size {
            break;
        }
        page += 1;
    }

    Ok(rows)
}

fn write_csv(path: &PathBuf, rows: &[StatusRow]) -> Result<Vec<u8>> {
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
    use chrono::TimeZone;
    use contracts::domain::a002_local_order::aggregate::{
        LocalOrderId, OrderAddress, OrderLine,
    };
    use contracts::domain::common::EntityMetadata;

    fn line(gtin: &str) -> OrderLine {
        OrderLine {
            gtin: gtin.to_string(),
            title: "Item".to_string(),
            quantity: 1,
            unit_price: 10.0,
            net_unit_price: 9.0,
            commission: 1.0,
            delivery_status: None,
            reduced_stock: false,
            restored_stock: false,
        }
    }

    fn order(remote_id: &str) -> LocalOrder {
        let created = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        LocalOrder {
            id: LocalOrderId::new_v4(),
            remote_order_id: remote_id.to_string(),
            status: OrderStatus::Processing,
            currency: "EUR".to_string(),
            billing: OrderAddress::default(),
            shipping: OrderAddress::default(),
            lines: vec![line("40063813")],
            delivery_state: None,
            payout_status: None,
            is_paid: false,
            payment_method: None,
            date_paid: None,
            refund_amount: 0.0,
            expected_delivery_date: None,
            tracking_code: None,
            meta: Default::default(),
            notes: Vec::new(),
            last_sync_at: None,
            metadata: EntityMetadata::with_created_at(created),
        }
    }

    #[test]
    fn test_fallback_date_is_created_plus_three_days() {
        let order = order("N-1");
        let rows = rows_for_order(&order);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].expected_delivery_date, "04.01.24");
    }

    #[test]
    fn test_state_derived_from_order_status_when_never_set() {
        let mut o = order("N-1");
        assert_eq!(rows_for_order(&o)[0].state, DeliveryState::InPreparation);

        o.status = OrderStatus::Completed;
        assert_eq!(rows_for_order(&o)[0].state, DeliveryState::Delivered);

        // Сохранённое состояние имеет приоритет над производным
        o.delivery_state = Some(DeliveryState::Shipped);
        assert_eq!(rows_for_order(&o)[0].state, DeliveryState::Shipped);
    }

    #[test]
    fn test_tracking_code_fallback_keys() {
        let mut o = order("N-1");
        assert_eq!(rows_for_order(&o)[0].tracking_code, "");

        o.meta
            .insert("tracking_number".to_string(), "TN-2".to_string());
        assert_eq!(rows_for_order(&o)[0].tracking_code, "TN-2");

        o.meta
            .insert("_tracking_number".to_string(), "TN-1".to_string());
        assert_eq!(rows_for_order(&o)[0].tracking_code, "TN-1");

        o.tracking_code = Some("TN-OWN".to_string());
        assert_eq!(rows_for_order(&o)[0].tracking_code, "TN-OWN");
    }

    #[test]
    fn test_lines_without_gtin_skipped() {
        let mut o = order("N-1");
        o.lines.push(line(""));
        o.lines.push(line("40063814"));
        assert_eq!(rows_for_order(&o).len(), 2);
    }

    #[test]
    fn test_csv_shape() {
        let o = order("N-1");
        let rows = rows_for_order(&o);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.csv");
        let bytes = write_csv(&path, &rows).unwrap();

        assert_eq!(&bytes[..3], UTF8_BOM);
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "orderId,gtin,state,expectedDeliveryDate,trackingCode");
        assert_eq!(lines[1], "N-1,40063813,IN_PREPARATION,04.01.24,");
    }
}
