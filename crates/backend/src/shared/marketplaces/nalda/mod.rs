pub mod client;
pub mod error;

pub use client::NaldaApiClient;
