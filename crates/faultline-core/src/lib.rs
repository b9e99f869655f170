//! Faultline Core - Shared types for client-side error capture
//!
//! Provides:
//! - `Config`: typed capture configuration with validation and a builder
//! - `ErrorReport` / `ErrorKind`: the wire-level report record
//! - `CapturedValue` / `normalize`: canonicalization of arbitrary error values

pub mod config;
pub mod report;
pub mod value;

pub use config::{Config, ConfigBuilder, ValidationError};
pub use report::{ErrorKind, ErrorReport, Metadata};
pub use value::{normalize, CapturedValue, NormalizedError};
