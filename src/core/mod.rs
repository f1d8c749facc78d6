//! Core conversion logic and abstractions

pub mod config;
pub mod conversion;
pub mod error;
pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use conversion::{BASE_CURRENCY, ConversionRequest, ConversionResult, convert};
pub use error::{ConvertError, ConvertResult};
pub use rates::{RateProvider, RateTable};
