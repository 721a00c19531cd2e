pub mod catalog;
pub mod logs;
pub mod orders;
pub mod settings;
pub mod sync;
