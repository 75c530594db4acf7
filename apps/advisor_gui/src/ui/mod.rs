//! UI layer for the advisor form.

pub mod app;

pub use app::AdvisorApp;
