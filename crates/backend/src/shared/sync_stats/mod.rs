pub mod repository;

pub use repository::{list_all, record_run};
