//! Shared utilities for analyst-rs
//!
//! This crate provides the ambient pieces used across the analyst-rs
//! workspace: tracing setup and environment-driven application configuration.

pub mod config;
pub mod logging;

pub use config::{AppConfig, ConfigError};
pub use logging::{init_tracing, init_tracing_with};
