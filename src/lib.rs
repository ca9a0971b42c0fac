// Library crate shared by the dashboard binary, the sample-data generator,
// the integration tests and the criterion benchmarks.

rust_i18n::i18n!("locales", fallback = "en");

pub mod app;
pub mod config;
pub mod data;
pub mod engine;
pub mod event;
pub mod session;
pub mod ui;
