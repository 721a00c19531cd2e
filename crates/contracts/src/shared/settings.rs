use serde::{Deserialize, Serialize};

/// Интервал расписания синхронизации (фиксированный набор)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleInterval {
    Every15m,
    Every30m,
    Hourly,
    Every6h,
    Every12h,
    Daily,
}

impl ScheduleInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleInterval::Every15m => "15m",
            ScheduleInterval::Every30m => "30m",
            ScheduleInterval::Hourly => "1h",
            ScheduleInterval::Every6h => "6h",
            ScheduleInterval::Every12h => "12h",
            ScheduleInterval::Daily => "daily",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "15m" => Some(ScheduleInterval::Every15m),
            "30m" => Some(ScheduleInterval::Every30m),
            "1h" => Some(ScheduleInterval::Hourly),
            "6h" => Some(ScheduleInterval::Every6h),
            "12h" => Some(ScheduleInterval::Every12h),
            "daily" => Some(ScheduleInterval::Daily),
            _ => None,
        }
    }

    pub fn minutes(&self) -> i64 {
        match self {
            ScheduleInterval::Every15m => 15,
            ScheduleInterval::Every30m => 30,
            ScheduleInterval::Hourly => 60,
            ScheduleInterval::Every6h => 360,
            ScheduleInterval::Every12h => 720,
            ScheduleInterval::Daily => 1440,
        }
    }
}

/// Режим участия товаров в экспорте по умолчанию
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDefaultMode {
    IncludeAll,
    ExcludeAll,
}

/// Настройки одного расписания
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TriggerSettings {
    pub enabled: bool,
    pub interval: ScheduleInterval,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: ScheduleInterval::Hourly,
        }
    }
}

/// Настройки плагина синхронизации. Хранятся одной записью в БД,
/// передаются в каждый executor явно (никаких глобальных настроек).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Базовый URL REST API маркетплейса
    pub nalda_api_url: String,
    pub nalda_api_key: String,
    /// Лицензия и домен магазина — уходят с каждой загрузкой CSV
    pub license_key: String,
    pub shop_domain: String,
    pub sftp_host: String,
    pub sftp_port: u16,
    pub sftp_username: String,
    pub sftp_password: String,
    /// Размер страницы при чтении каталога
    pub batch_size: u64,
    /// Шаблон имени файла экспорта: {date}, {datetime}, {timestamp}
    pub filename_pattern: String,
    pub status_filename_pattern: String,
    /// Срок доставки по умолчанию, дней
    pub default_delivery_time: i32,
    /// Срок возврата, дней
    pub return_period: i32,
    pub default_country: String,
    pub default_condition: String,
    pub currency: String,
    /// Ставки НДС по налоговым классам магазина
    pub tax_rate_standard: f64,
    pub tax_rate_reduced: f64,
    pub sync_default_mode: SyncDefaultMode,
    pub export: TriggerSettings,
    pub order_import: TriggerSettings,
    pub status_export: TriggerSettings,
    /// Глубина выборки заказов при импорте, дней назад
    pub order_import_days_back: i64,
    /// Уменьшать остаток при создании заказа
    pub reduce_stock_on_import: bool,
    pub log_enabled: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            nalda_api_url: "https://api.nalda.com".to_string(),
            nalda_api_key: String::new(),
            license_key: String::new(),
            shop_domain: String::new(),
            sftp_host: String::new(),
            sftp_port: 22,
            sftp_username: String::new(),
            sftp_password: String::new(),
            batch_size: 100,
            filename_pattern: "nalda-products-{datetime}.csv".to_string(),
            status_filename_pattern: "nalda-order-status-{datetime}.csv".to_string(),
            default_delivery_time: 3,
            return_period: 14,
            default_country: "DE".to_string(),
            default_condition: "new".to_string(),
            currency: "EUR".to_string(),
            tax_rate_standard: 19.0,
            tax_rate_reduced: 7.0,
            sync_default_mode: SyncDefaultMode::IncludeAll,
            export: TriggerSettings::default(),
            order_import: TriggerSettings::default(),
            status_export: TriggerSettings::default(),
            order_import_days_back: 30,
            reduce_stock_on_import: true,
            log_enabled: true,
        }
    }
}

impl SyncSettings {
    /// Учётные данные API заполнены
    pub fn has_api_credentials(&self) -> bool {
        !self.nalda_api_url.trim().is_empty() && !self.nalda_api_key.trim().is_empty()
    }

    /// Всё необходимое для загрузки CSV заполнено
    pub fn has_upload_credentials(&self) -> bool {
        !self.license_key.trim().is_empty()
            && !self.shop_domain.trim().is_empty()
            && !self.sftp_host.trim().is_empty()
            && !self.sftp_username.trim().is_empty()
    }
}

/// Подставить плейсхолдеры {date}/{datetime}/{timestamp} в шаблон имени файла
pub fn render_filename(pattern: &str, now: chrono::DateTime<chrono::Utc>) -> String {
    pattern
        .replace("{date}", &now.format("%Y-%m-%d").to_string())
        .replace("{datetime}", &now.format("%Y-%m-%d_%H-%M-%S").to_string())
        .replace("{timestamp}", &now.timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_filename_placeholders() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(
            render_filename("export-{date}.csv", now),
            "export-2024-01-02.csv"
        );
        assert_eq!(
            render_filename("export-{datetime}.csv", now),
            "export-2024-01-02_03-04-05.csv"
        );
        assert_eq!(
            render_filename("export-{timestamp}.csv", now),
            format!("export-{}.csv", now.timestamp())
        );
        // Шаблон без плейсхолдеров остаётся как есть
        assert_eq!(render_filename("fixed.csv", now), "fixed.csv");
    }

    #[test]
    fn test_interval_roundtrip() {
        for s in ["15m", "30m", "1h", "6h", "12h", "daily"] {
            let parsed = ScheduleInterval::parse(s).unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert!(ScheduleInterval::parse("2h").is_none());
    }

    #[test]
    fn test_interval_minutes() {
        assert_eq!(ScheduleInterval::Every15m.minutes(), 15);
        assert_eq!(ScheduleInterval::Daily.minutes(), 1440);
    }
}
