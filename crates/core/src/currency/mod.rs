//! Currency conversion into the reporting currency.

pub mod service;

pub use service::CurrencyService;
