//! Core business logic abstractions

pub mod config;
pub mod convert;
pub mod log;
pub mod rates;
pub mod session;

// Re-export main types for cleaner imports
pub use convert::convert;
pub use rates::{CurrencyCode, RateError, RateProvider, RateTable};
pub use session::{ConversionSession, FetchTicket, SessionStatus};
