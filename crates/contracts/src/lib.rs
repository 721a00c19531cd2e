//! Contracts: чистые типы, общие для backend и потребителей его API.
//! Никакого I/O — только структуры данных, enum'ы и их преобразования.

pub mod domain;
pub mod shared;
pub mod usecases;
