use crate::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// ID типа для товара каталога
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogItemId(pub Uuid);

impl CatalogItemId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for CatalogItemId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(CatalogItemId)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Статус товара в локальном магазине
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Published,
    Draft,
    Trashed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Published => "published",
            ItemStatus::Draft => "draft",
            ItemStatus::Trashed => "trashed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "published" => Some(ItemStatus::Published),
            "draft" => Some(ItemStatus::Draft),
            "trashed" => Some(ItemStatus::Trashed),
            _ => None,
        }
    }
}

/// Переопределение участия товара в синхронизации.
/// Тройное состояние: наследовать режим по умолчанию, включить явно,
/// выключить явно.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOverride {
    #[default]
    Inherit,
    Enabled,
    Disabled,
}

/// Габариты и вес с исходными единицами измерения.
/// Конвертация в мм/г выполняется экспортёром, не хранилищем.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemDimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Единица длины: m, cm, mm, in, yd
    pub dimension_unit: String,
    pub weight: Option<f64>,
    /// Единица веса: kg, g, lbs, oz
    pub weight_unit: String,
}

/// Книжные метаданные (экспортируются только для книжных категорий)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookMeta {
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub pages: Option<i32>,
    pub publication_year: Option<i32>,
    pub binding: Option<String>,
    pub edition: Option<String>,
    pub genre: Option<String>,
}

/// Переопределения полей, специфичных для маркетплейса
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketplaceOverrides {
    /// Срок доставки в днях (если пусто — берётся из настроек)
    pub delivery_time_days: Option<i32>,
    /// Состояние товара (new/used/refurbished)
    pub condition: Option<String>,
    pub book: BookMeta,
}

/// Товар каталога локального магазина.
/// Читается экспортёром; записывается только в части остатков
/// (резервирование/возврат при импорте заказов).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: CatalogItemId,
    /// Родительский товар для вариаций
    pub parent_id: Option<CatalogItemId>,
    pub sku: String,
    pub title: String,
    pub description: String,
    pub status: ItemStatus,
    pub price: f64,
    /// Налоговый класс локального магазина (standard/reduced)
    pub tax_class: String,
    /// Остаток; None — учёт остатков выключен
    pub stock: Option<i32>,
    pub backorders_allowed: bool,
    /// Нативное поле глобального идентификатора (приоритетный источник GTIN)
    pub gtin: Option<String>,
    /// Произвольные метаданные (источник запасных GTIN и трекинг-кодов)
    pub meta: BTreeMap<String, String>,
    pub dimensions: ItemDimensions,
    /// Путь категории, например "Books > Fiction"
    pub category_path: Option<String>,
    pub google_category: Option<String>,
    pub brand: Option<String>,
    pub main_image_url: Option<String>,
    /// Дополнительные изображения (в экспорт попадают первые 4)
    pub gallery_image_urls: Vec<String>,
    pub size: Option<String>,
    pub colour: Option<String>,
    pub country_of_origin: Option<String>,
    pub sync_override: SyncOverride,
    pub overrides: MarketplaceOverrides,
    pub metadata: EntityMetadata,
}

/// Ключи метаданных, в которых ищется GTIN (в порядке приоритета)
pub const GTIN_META_KEYS: [&str; 10] = [
    "_gtin", "_ean", "_isbn", "_upc", "gtin", "ean", "isbn", "upc", "_barcode", "barcode",
];

fn is_gtin_like(s: &str) -> bool {
    let s = s.trim();
    (8..=14).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

impl CatalogItem {
    pub fn new(sku: String, title: String) -> Self {
        Self {
            id: CatalogItemId::new_v4(),
            parent_id: None,
            sku,
            title,
            description: String::new(),
            status: ItemStatus::Published,
            price: 0.0,
            tax_class: "standard".to_string(),
            stock: None,
            backorders_allowed: false,
            gtin: None,
            meta: BTreeMap::new(),
            dimensions: ItemDimensions::default(),
            category_path: None,
            google_category: None,
            brand: None,
            main_image_url: None,
            gallery_image_urls: Vec::new(),
            size: None,
            colour: None,
            country_of_origin: None,
            sync_override: SyncOverride::Inherit,
            overrides: MarketplaceOverrides::default(),
            metadata: EntityMetadata::new(),
        }
    }

    pub fn is_variant(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Разрешить GTIN товара: нативное поле → ключи метаданных по
    /// порядку → SKU, если он состоит из 8-14 цифр. None —
    /// идентификатор не найден. Единая цепочка для экспорта и для
    /// поиска товара по GTIN из строк заказа.
    pub fn resolve_gtin(&self) -> Option<String> {
        if let Some(gtin) = &self.gtin {
            if !gtin.trim().is_empty() {
                return Some(gtin.trim().to_string());
            }
        }

        for key in GTIN_META_KEYS {
            if let Some(value) = self.meta.get(key) {
                if !value.trim().is_empty() {
                    return Some(value.trim().to_string());
                }
            }
        }

        if is_gtin_like(&self.sku) {
            return Some(self.sku.trim().to_string());
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(sku: &str) -> CatalogItem {
        CatalogItem::new(sku.to_string(), format!("Item {}", sku))
    }

    #[test]
    fn test_gtin_resolution_order() {
        let mut it = item("ABC-1");
        assert_eq!(it.resolve_gtin(), None);

        it.meta.insert("barcode".to_string(), "111111110".to_string());
        assert_eq!(it.resolve_gtin().as_deref(), Some("111111110"));

        it.meta.insert("_ean".to_string(), "222222220".to_string());
        assert_eq!(it.resolve_gtin().as_deref(), Some("222222220"));

        it.gtin = Some("4006381333931".to_string());
        assert_eq!(it.resolve_gtin().as_deref(), Some("4006381333931"));
    }

    #[test]
    fn test_numeric_sku_acts_as_gtin() {
        assert_eq!(item("40063813").resolve_gtin().as_deref(), Some("40063813"));
        // 7 цифр — слишком коротко
        assert_eq!(item("4006381").resolve_gtin(), None);
        // 15 цифр — слишком длинно
        assert_eq!(item("400638133393112").resolve_gtin(), None);
        assert_eq!(item("4006381x").resolve_gtin(), None);
    }
}
