//! Multi-signer, time-locked governance for privileged platform changes.

pub mod api_error;
pub mod config;
pub mod governance;
pub mod http;
pub mod middleware;
pub mod models;
pub mod service;
pub mod telemetry;
