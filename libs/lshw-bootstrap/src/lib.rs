#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Host bootstrap for the hardware inventory engine
//!
//! Provides layered configuration loading, logging initialization, snapshot
//! loading and a one-call report builder for processes embedding
//! `lshw_core`.

pub mod config;
pub mod logging;
pub mod paths;
pub mod report;

pub use config::{AppConfig, ENV_PREFIX, LogFormat, LoggingConfig, ReportConfig};
pub use logging::{build_filter, init_logging};
pub use paths::{PathError, expand_tilde, resolve_existing};
pub use report::{build_report, load_snapshot};
