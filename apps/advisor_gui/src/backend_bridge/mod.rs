//! Backend worker: owns the HTTP client and runs commands off the UI thread.

pub mod commands;
pub mod runtime;
