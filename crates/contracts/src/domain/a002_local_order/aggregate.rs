use crate::domain::common::{AggregateId, EntityMetadata};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для локального заказа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalOrderId(pub Uuid);

impl LocalOrderId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for LocalOrderId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(LocalOrderId)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Статус заказа в локальном магазине
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Черновой статус на время создания (не рассылает уведомления)
    Pending,
    Processing,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

/// Статус доставки позиции/заказа в терминах маркетплейса
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryState {
    InPreparation,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl DeliveryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryState::InPreparation => "IN_PREPARATION",
            DeliveryState::Shipped => "SHIPPED",
            DeliveryState::Delivered => "DELIVERED",
            DeliveryState::Cancelled => "CANCELLED",
            DeliveryState::Returned => "RETURNED",
        }
    }

    /// Разобрать строку статуса из API (пустая строка → None)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "IN_PREPARATION" => Some(DeliveryState::InPreparation),
            "SHIPPED" => Some(DeliveryState::Shipped),
            "DELIVERED" => Some(DeliveryState::Delivered),
            "CANCELLED" => Some(DeliveryState::Cancelled),
            "RETURNED" => Some(DeliveryState::Returned),
            _ => None,
        }
    }

    /// Статусы, при переходе в которые возвращается остаток
    pub fn releases_stock(&self) -> bool {
        matches!(self, DeliveryState::Cancelled | DeliveryState::Returned)
    }
}

/// Адрес/идентичность стороны заказа
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderAddress {
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub street: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Позиция локального заказа.
/// `net_unit_price` = цена покупателя за вычетом комиссии на единицу,
/// не ниже нуля.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub gtin: String,
    pub title: String,
    pub quantity: i32,
    /// Цена покупателя за единицу
    pub unit_price: f64,
    /// Цена за единицу за вычетом комиссии (floored at 0)
    pub net_unit_price: f64,
    /// Комиссия маркетплейса на позицию (вся позиция, не единица)
    pub commission: f64,
    /// Последний известный статус доставки позиции
    pub delivery_status: Option<DeliveryState>,
    /// Остаток был уменьшен при создании заказа
    pub reduced_stock: bool,
    /// Остаток уже был возвращён (защита от повторного возврата)
    pub restored_stock: bool,
}

impl OrderLine {
    /// Чистая цена за единицу: max(0, price - commission/qty)
    pub fn net_price(unit_price: f64, commission: f64, quantity: i32) -> f64 {
        if quantity <= 0 {
            return 0.0;
        }
        (unit_price - commission / quantity as f64).max(0.0)
    }
}

/// Заметка аудита заказа
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderNote {
    pub created_at: DateTime<Utc>,
    pub message: String,
}

/// Локальный заказ, связанный 1:1 с заказом маркетплейса через
/// `remote_order_id`. Биллинг указывает на юридическое лицо
/// маркетплейса; конечный покупатель хранится только в shipping —
/// чтобы заказ не появлялся в личном кабинете покупателя магазина.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalOrder {
    pub id: LocalOrderId,
    /// Внешняя ссылка на заказ маркетплейса (уникальна)
    pub remote_order_id: String,
    pub status: OrderStatus,
    pub currency: String,
    pub billing: OrderAddress,
    pub shipping: OrderAddress,
    pub lines: Vec<OrderLine>,
    /// Состояние доставки на уровне заказа (для статус-экспорта).
    /// None — состояние ни разу не выставлялось (заказ привязан к
    /// маркетплейсу вне импорта); экспорт выводит его из статуса заказа.
    pub delivery_state: Option<DeliveryState>,
    /// Последний известный статус выплаты из API (сырая строка)
    pub payout_status: Option<String>,
    pub is_paid: bool,
    pub payment_method: Option<String>,
    pub date_paid: Option<DateTime<Utc>>,
    /// Сумма возврата по данным маркетплейса
    pub refund_amount: f64,
    pub expected_delivery_date: Option<NaiveDate>,
    pub tracking_code: Option<String>,
    /// Произвольные метаданные заказа (источник запасных трекинг-кодов)
    pub meta: std::collections::BTreeMap<String, String>,
    pub notes: Vec<OrderNote>,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub metadata: EntityMetadata,
}

impl LocalOrder {
    pub fn add_note(&mut self, message: impl Into<String>) {
        self.notes.push(OrderNote {
            created_at: Utc::now(),
            message: message.into(),
        });
    }

    /// Сумма заказа по ценам покупателя
    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.unit_price * l.quantity as f64)
            .sum()
    }

    pub fn line_by_gtin_mut(&mut self, gtin: &str) -> Option<&mut OrderLine> {
        self.lines.iter_mut().find(|l| l.gtin == gtin)
    }
}
