use anyhow::Result;
use chrono::NaiveDate;
use contracts::shared::settings::SyncSettings;
use serde::{Deserialize, Serialize};

use super::error::NaldaUploadError;

/// HTTP-клиент для работы с Nalda Marketplace API.
/// Авторизация — статический API-ключ в заголовке.
pub struct NaldaApiClient {
    client: reqwest::Client,
}

const API_KEY_HEADER: &str = "X-Api-Key";

impl NaldaApiClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    fn base_url(settings: &SyncSettings) -> String {
        settings.nalda_api_url.trim_end_matches('/').to_string()
    }

    /// Получить заказы за диапазон дат.
    /// Endpoint: POST /orders {from, to}
    pub async fn fetch_orders(
        &self,
        settings: &SyncSettings,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<RemoteOrder>> {
        if !settings.has_api_credentials() {
            anyhow::bail!("Nalda API URL and API key are required");
        }

        let url = format!("{}/orders", Self::base_url(settings));
        let request_body = OrdersRequest {
            from: date_from.format("%Y-%m-%d").to_string(),
            to: date_to.format("%Y-%m-%d").to_string(),
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &settings.nalda_api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Nalda orders request failed: {}", body);
            anyhow::bail!("Nalda orders request failed with status {}: {}", status, body);
        }

        let body = response.text().await?;
        let parsed: OrdersResponse = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(500).collect();
            tracing::error!("Failed to parse Nalda orders response: {}", e);
            anyhow::anyhow!("Failed to parse Nalda orders JSON: {}. Response: {}", e, preview)
        })?;

        if !parsed.success {
            anyhow::bail!("Nalda orders request was not successful");
        }

        tracing::info!(
            "Nalda API returned {} orders for {}..{}",
            parsed.result.len(),
            request_body.from,
            request_body.to
        );
        Ok(parsed.result)
    }

    /// Получить позиции конкретного заказа.
    /// Endpoint: GET /orders/{id}/items
    pub async fn fetch_order_items(
        &self,
        settings: &SyncSettings,
        remote_order_id: &str,
    ) -> Result<Vec<RemoteOrderItem>> {
        let url = format!(
            "{}/orders/{}/items",
            Self::base_url(settings),
            remote_order_id
        );

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &settings.nalda_api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Nalda order items request for {} failed with status {}: {}",
                remote_order_id,
                status,
                body
            );
        }

        let parsed: OrderItemsResponse = response.json().await?;
        if !parsed.success {
            anyhow::bail!("Nalda order items request for {} was not successful", remote_order_id);
        }
        Ok(parsed.result)
    }

    /// Проверка учётных данных.
    /// Endpoint: GET /health-check (лёгкий вызов, таймаут короче)
    pub async fn health_check(&self, settings: &SyncSettings) -> Result<()> {
        if !settings.has_api_credentials() {
            anyhow::bail!("Nalda API URL and API key are required");
        }

        let url = format!("{}/health-check", Self::base_url(settings));
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &settings.nalda_api_key)
            .timeout(std::time::Duration::from_secs(15))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Nalda health-check failed with status {}", response.status());
        }
        Ok(())
    }

    /// Загрузить готовый CSV. Файл уходит multipart-запросом вместе с
    /// лицензией и SFTP-реквизитами; сервис сам кладёт его на SFTP.
    /// Endpoint: POST /csv-upload (тяжёлый вызов, таймаут длиннее)
    pub async fn upload_csv(
        &self,
        settings: &SyncSettings,
        csv_type: &str,
        file_name: &str,
        file_bytes: Vec<u8>,
    ) -> Result<CsvUploadData> {
        if !settings.has_upload_credentials() {
            anyhow::bail!("License key, shop domain and SFTP credentials are required");
        }

        let url = format!("{}/csv-upload", Self::base_url(settings));

        let file_part = reqwest::multipart::Part::bytes(file_bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;

        let form = reqwest::multipart::Form::new()
            .text("license_key", settings.license_key.clone())
            .text("domain", settings.shop_domain.clone())
            .text("csv_type", csv_type.to_string())
            .text("sftp_host", settings.sftp_host.clone())
            .text("sftp_port", settings.sftp_port.to_string())
            .text("sftp_username", settings.sftp_username.clone())
            .text("sftp_password", settings.sftp_password.clone())
            .part("csv_file", file_part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(std::time::Duration::from_secs(60))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let parsed: CsvUploadResponse = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(500).collect();
            anyhow::anyhow!(
                "Failed to parse csv-upload response (status {}): {}. Response: {}",
                status,
                e,
                preview
            )
        })?;

        if let Some(error) = parsed.error {
            tracing::error!(
                "CSV upload rejected: code={}, message={:?}",
                error.code,
                error.message
            );
            return Err(NaldaUploadError::from_raw(&error.code).into());
        }

        match parsed.data {
            Some(data) if parsed.success.unwrap_or(false) => Ok(data),
            _ => anyhow::bail!("csv-upload returned neither data nor error (status {})", status),
        }
    }
}

impl Default for NaldaApiClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Request/Response structures для Nalda API
// ============================================================================

#[derive(Debug, Clone, Serialize)]
struct OrdersRequest {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OrdersResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: Vec<RemoteOrder>,
}

#[derive(Debug, Clone, Deserialize)]
struct OrderItemsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: Vec<RemoteOrderItem>,
}

/// Заказ маркетплейса
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteOrder {
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(default)]
    pub customer: RemoteCustomer,
    #[serde(rename = "shippingAddress", default)]
    pub shipping_address: RemoteAddress,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "payoutStatus", default)]
    pub payout_status: Option<String>,
    #[serde(rename = "feeAmount", default)]
    pub fee_amount: Option<f64>,
    #[serde(rename = "commissionAmount", default)]
    pub commission_amount: Option<f64>,
    #[serde(rename = "refundAmount", default)]
    pub refund_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteCustomer {
    #[serde(rename = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteAddress {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

/// Позиция заказа маркетплейса
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteOrderItem {
    pub gtin: String,
    #[serde(default)]
    pub title: Option<String>,
    pub quantity: i32,
    #[serde(rename = "unitPrice")]
    pub unit_price: f64,
    /// Комиссия на всю позицию
    #[serde(default)]
    pub commission: f64,
    #[serde(rename = "deliveryStatus", default)]
    pub delivery_status: Option<String>,
    #[serde(rename = "plannedDeliveryDate", default)]
    pub planned_delivery_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CsvUploadResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<CsvUploadData>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Ответ сервиса загрузки при успехе
#[derive(Debug, Clone, Deserialize)]
pub struct CsvUploadData {
    pub id: i64,
    #[serde(default)]
    pub csv_file_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
}
