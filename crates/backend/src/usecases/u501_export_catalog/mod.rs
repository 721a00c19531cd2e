pub mod executor;
pub mod field_mapper;
pub mod units;

pub use executor::ExportExecutor;
