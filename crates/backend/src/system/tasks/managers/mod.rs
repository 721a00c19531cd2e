pub mod u501_export_catalog;
pub mod u502_import_orders;
pub mod u503_export_order_status;

pub use u501_export_catalog::U501ExportCatalogManager;
pub use u502_import_orders::U502ImportOrdersManager;
pub use u503_export_order_status::U503ExportOrderStatusManager;
