pub mod u502_import_orders;
