pub mod executor;

pub use executor::StatusExportExecutor;
