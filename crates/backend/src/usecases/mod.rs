pub mod reporting;
pub mod u501_export_catalog;
pub mod u502_import_orders;
pub mod u503_export_order_status;
