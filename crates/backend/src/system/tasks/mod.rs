pub mod initialization;
pub mod manager;
pub mod managers;
pub mod registry;
pub mod repository;
pub mod service;
pub mod worker;
