pub mod repository;

pub use repository::{append_run_log, clear_all, list_all, MAX_LOG_ENTRIES};
