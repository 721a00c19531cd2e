pub mod executor;
pub mod reconciler;

pub use executor::ImportOrdersExecutor;
