//! Построение плоской строки экспорта из товара каталога:
//! разрешение GTIN, политика включения, флаг деактивации, наследование
//! полей вариацией от родителя.

use contracts::domain::a001_catalog_item::aggregate::{CatalogItem, ItemStatus, SyncOverride};
use contracts::shared::settings::{SyncDefaultMode, SyncSettings};

use super::units;

/// Фиксированный порядок колонок CSV-экспорта
pub const HEADER: [&str; 37] = [
    "gtin",
    "title",
    "country",
    "condition",
    "price",
    "tax",
    "currency",
    "delivery_time_days",
    "stock",
    "return_days",
    "main_image_url",
    "brand",
    "category",
    "google_category",
    "description",
    "length_mm",
    "width_mm",
    "height_mm",
    "weight_g",
    "shipping_length_mm",
    "shipping_width_mm",
    "shipping_height_mm",
    "size",
    "colour",
    "image_url_2",
    "image_url_3",
    "image_url_4",
    "image_url_5",
    "delete_product",
    "book_author",
    "book_publisher",
    "book_language",
    "book_pages",
    "book_publication_year",
    "book_binding",
    "book_edition",
    "book_genre",
];

/// Одна строка экспортного CSV
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub gtin: String,
    pub title: String,
    pub country: String,
    pub condition: String,
    pub price: f64,
    pub tax: f64,
    pub currency: String,
    pub delivery_time_days: i32,
    pub stock: Option<i32>,
    pub return_days: i32,
    pub main_image_url: String,
    pub brand: String,
    pub category: String,
    pub google_category: String,
    pub description: String,
    pub length_mm: Option<i64>,
    pub width_mm: Option<i64>,
    pub height_mm: Option<i64>,
    pub weight_g: Option<f64>,
    pub shipping_length_mm: Option<i64>,
    pub shipping_width_mm: Option<i64>,
    pub shipping_height_mm: Option<i64>,
    pub size: String,
    pub colour: String,
    pub extra_image_urls: [String; 4],
    pub delete_product: bool,
    pub book_author: String,
    pub book_publisher: String,
    pub book_language: String,
    pub book_pages: Option<i32>,
    pub book_publication_year: Option<i32>,
    pub book_binding: String,
    pub book_edition: String,
    pub book_genre: String,
}

impl ExportRow {
    pub fn to_record(&self) -> Vec<String> {
        fn opt_i64(v: Option<i64>) -> String {
            v.map(|x| x.to_string()).unwrap_or_default()
        }
        fn opt_i32(v: Option<i32>) -> String {
            v.map(|x| x.to_string()).unwrap_or_default()
        }
        fn opt_f64(v: Option<f64>) -> String {
            v.map(|x| x.to_string()).unwrap_or_default()
        }

        vec![
            self.gtin.clone(),
            self.title.clone(),
            self.country.clone(),
            self.condition.clone(),
            format!("{:.2}", self.price),
            self.tax.to_string(),
            self.currency.clone(),
            self.delivery_time_days.to_string(),
            opt_i32(self.stock),
            self.return_days.to_string(),
            self.main_image_url.clone(),
            self.brand.clone(),
            self.category.clone(),
            self.google_category.clone(),
            self.description.clone(),
            opt_i64(self.length_mm),
            opt_i64(self.width_mm),
            opt_i64(self.height_mm),
            opt_f64(self.weight_g),
            opt_i64(self.shipping_length_mm),
            opt_i64(self.shipping_width_mm),
            opt_i64(self.shipping_height_mm),
            self.size.clone(),
            self.colour.clone(),
            self.extra_image_urls[0].clone(),
            self.extra_image_urls[1].clone(),
            self.extra_image_urls[2].clone(),
            self.extra_image_urls[3].clone(),
            if self.delete_product { "1" } else { "" }.to_string(),
            self.book_author.clone(),
            self.book_publisher.clone(),
            self.book_language.clone(),
            opt_i32(self.book_pages),
            opt_i32(self.book_publication_year),
            self.book_binding.clone(),
            self.book_edition.clone(),
            self.book_genre.clone(),
        ]
    }
}

/// Политика включения товара в синхронизацию: явное переопределение
/// имеет приоритет, иначе действует режим по умолчанию.
pub fn in_sync_scope(item: &CatalogItem, settings: &SyncSettings) -> bool {
    match item.sync_override {
        SyncOverride::Enabled => true,
        SyncOverride::Disabled => false,
        SyncOverride::Inherit => settings.sync_default_mode == SyncDefaultMode::IncludeAll,
    }
}

/// Флаг деактивации листинга на стороне маркетплейса: товар в корзине
/// либо остаток исчерпан без возможности предзаказа.
pub fn is_delete_flagged(item: &CatalogItem) -> bool {
    if item.status == ItemStatus::Trashed {
        return true;
    }
    match item.stock {
        Some(stock) => stock <= 0 && !item.backorders_allowed,
        None => false,
    }
}

fn tax_rate(tax_class: &str, settings: &SyncSettings) -> f64 {
    match tax_class {
        "reduced" => settings.tax_rate_reduced,
        _ => settings.tax_rate_standard,
    }
}

fn inherit<'a>(own: &'a Option<String>, parent: Option<&'a CatalogItem>, pick: fn(&CatalogItem) -> &Option<String>) -> String {
    if let Some(v) = own {
        if !v.trim().is_empty() {
            return v.clone();
        }
    }
    parent
        .and_then(|p| pick(p).clone())
        .unwrap_or_default()
}

/// Построить строку экспорта. Для вариации передаётся родитель —
/// пустые поля вариации наследуются от него. None — GTIN не разрешён.
pub fn map_item(
    item: &CatalogItem,
    parent: Option<&CatalogItem>,
    settings: &SyncSettings,
) -> Option<ExportRow> {
    let gtin = item.resolve_gtin()?;

    let title = if item.title.trim().is_empty() {
        parent.map(|p| p.title.clone()).unwrap_or_default()
    } else {
        item.title.clone()
    };
    let description = if item.description.trim().is_empty() {
        parent.map(|p| p.description.clone()).unwrap_or_default()
    } else {
        item.description.clone()
    };

    let dims = if item.dimensions.length.is_none()
        && item.dimensions.width.is_none()
        && item.dimensions.height.is_none()
        && item.dimensions.weight.is_none()
    {
        parent.map(|p| &p.dimensions).unwrap_or(&item.dimensions)
    } else {
        &item.dimensions
    };

    let length_mm = units::to_millimeters(dims.length, &dims.dimension_unit);
    let width_mm = units::to_millimeters(dims.width, &dims.dimension_unit);
    let height_mm = units::to_millimeters(dims.height, &dims.dimension_unit);
    let weight_g = units::to_grams(dims.weight, &dims.weight_unit);

    // Транспортные габариты: +10% к габаритам товара
    let shipping = |v: Option<i64>| v.map(|x| ((x as f64) * 1.1).round() as i64);

    let overrides = &item.overrides;
    let parent_overrides = parent.map(|p| &p.overrides);
    let delivery_time_days = overrides
        .delivery_time_days
        .or(parent_overrides.and_then(|o| o.delivery_time_days))
        .unwrap_or(settings.default_delivery_time);
    let condition = overrides
        .condition
        .clone()
        .or(parent_overrides.and_then(|o| o.condition.clone()))
        .unwrap_or_else(|| settings.default_condition.clone());

    let book = if overrides.book.author.is_some() || parent.is_none() {
        &overrides.book
    } else {
        parent_overrides.map(|o| &o.book).unwrap_or(&overrides.book)
    };

    let mut extra_image_urls: [String; 4] = Default::default();
    let gallery = if item.gallery_image_urls.is_empty() {
        parent.map(|p| p.gallery_image_urls.as_slice()).unwrap_or(&[])
    } else {
        item.gallery_image_urls.as_slice()
    };
    for (slot, url) in extra_image_urls.iter_mut().zip(gallery.iter()) {
        *slot = url.clone();
    }

    let country = {
        let own = inherit(&item.country_of_origin, parent, |p| &p.country_of_origin);
        if own.trim().is_empty() {
            settings.default_country.clone()
        } else {
            own
        }
    };

    Some(ExportRow {
        gtin,
        title,
        country,
        condition,
        price: item.price,
        tax: tax_rate(&item.tax_class, settings),
        currency: settings.currency.clone(),
        delivery_time_days,
        stock: item.stock,
        return_days: settings.return_period,
        main_image_url: inherit(&item.main_image_url, parent, |p| &p.main_image_url),
        brand: inherit(&item.brand, parent, |p| &p.brand),
        category: inherit(&item.category_path, parent, |p| &p.category_path),
        google_category: inherit(&item.google_category, parent, |p| &p.google_category),
        description,
        length_mm,
        width_mm,
        height_mm,
        weight_g,
        shipping_length_mm: shipping(length_mm),
        shipping_width_mm: shipping(width_mm),
        shipping_height_mm: shipping(height_mm),
        size: inherit(&item.size, parent, |p| &p.size),
        colour: inherit(&item.colour, parent, |p| &p.colour),
        extra_image_urls,
        delete_product: is_delete_flagged(item),
        book_author: book.author.clone().unwrap_or_default(),
        book_publisher: book.publisher.clone().unwrap_or_default(),
        book_language: book.language.clone().unwrap_or_default(),
        book_pages: book.pages,
        book_publication_year: book.publication_year,
        book_binding: book.binding.clone().unwrap_or_default(),
        book_edition: book.edition.clone().unwrap_or_default(),
        book_genre: book.genre.clone().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_catalog_item::aggregate::CatalogItemId;

    fn item(sku: &str) -> CatalogItem {
        CatalogItem::new(sku.to_string(), format!("Item {}", sku))
    }

    #[test]
    fn test_sync_scope_policy() {
        let mut settings = SyncSettings::default();
        settings.sync_default_mode = SyncDefaultMode::IncludeAll;

        let mut it = item("A");
        assert!(in_sync_scope(&it, &settings));

        it.sync_override = SyncOverride::Disabled;
        assert!(!in_sync_scope(&it, &settings));

        settings.sync_default_mode = SyncDefaultMode::ExcludeAll;
        it.sync_override = SyncOverride::Inherit;
        assert!(!in_sync_scope(&it, &settings));

        it.sync_override = SyncOverride::Enabled;
        assert!(in_sync_scope(&it, &settings));
    }

    #[test]
    fn test_delete_flag() {
        let mut it = item("A");
        assert!(!is_delete_flagged(&it));

        it.stock = Some(0);
        assert!(is_delete_flagged(&it));

        it.backorders_allowed = true;
        assert!(!is_delete_flagged(&it));

        it.backorders_allowed = false;
        it.stock = Some(5);
        assert!(!is_delete_flagged(&it));

        it.status = ItemStatus::Trashed;
        assert!(is_delete_flagged(&it));
    }

    #[test]
    fn test_shipping_dimensions_scaled() {
        let settings = SyncSettings::default();
        let mut it = item("40063813");
        it.dimensions.length = Some(20.0);
        it.dimensions.width = Some(10.0);
        it.dimensions.height = Some(5.0);
        it.dimensions.dimension_unit = "cm".to_string();

        let row = map_item(&it, None, &settings).unwrap();
        assert_eq!(row.length_mm, Some(200));
        assert_eq!(row.shipping_length_mm, Some(220));
        assert_eq!(row.width_mm, Some(100));
        assert_eq!(row.shipping_width_mm, Some(110));
        assert_eq!(row.height_mm, Some(50));
        assert_eq!(row.shipping_height_mm, Some(55));
    }

    #[test]
    fn test_variant_inherits_parent_fields() {
        let settings = SyncSettings::default();
        let mut parent = item("PARENT");
        parent.brand = Some("Acme".to_string());
        parent.category_path = Some("Books > Fiction".to_string());
        parent.main_image_url = Some("https://img/main.jpg".to_string());
        parent.description = "Long description".to_string();

        let mut variant = item("40063813");
        variant.parent_id = Some(CatalogItemId::new_v4());
        variant.title = String::new();
        variant.description = String::new();
        variant.size = Some("L".to_string());

        let row = map_item(&variant, Some(&parent), &settings).unwrap();
        assert_eq!(row.title, "Item PARENT");
        assert_eq!(row.brand, "Acme");
        assert_eq!(row.category, "Books > Fiction");
        assert_eq!(row.main_image_url, "https://img/main.jpg");
        assert_eq!(row.description, "Long description");
        // Собственное значение вариации не перекрывается
        assert_eq!(row.size, "L");
    }

    #[test]
    fn test_tax_and_defaults() {
        let settings = SyncSettings::default();
        let mut it = item("40063813");
        it.tax_class = "reduced".to_string();

        let row = map_item(&it, None, &settings).unwrap();
        assert_eq!(row.tax, settings.tax_rate_reduced);
        assert_eq!(row.country, "DE");
        assert_eq!(row.condition, "new");
        assert_eq!(row.delivery_time_days, settings.default_delivery_time);
        assert_eq!(row.return_days, settings.return_period);
    }

    #[test]
    fn test_record_matches_header_width() {
        let settings = SyncSettings::default();
        let row = map_item(&item("40063813"), None, &settings).unwrap();
        assert_eq!(row.to_record().len(), HEADER.len());
    }
}
