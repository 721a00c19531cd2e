use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Параметры ручного запуска импорта заказов.
/// Пустой диапазон — взять глубину из настроек.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportOrdersRequest {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}
