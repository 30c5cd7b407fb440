//! Backend error types and their HTTP conversions.

pub mod conversion;
pub mod types;

pub use types::BackendError;
