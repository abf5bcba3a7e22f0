pub mod conversion;
pub mod data;
