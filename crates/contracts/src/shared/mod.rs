pub mod logger;
pub mod schedule;
pub mod settings;
pub mod sync_result;
pub mod sync_stats;
