pub mod common;
pub mod a001_catalog_item;
pub mod a002_local_order;
