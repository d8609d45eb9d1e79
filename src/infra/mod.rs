//! Infrastructure adapters and runtime bootstrap.

pub mod credentials;
pub mod error;
pub mod files;
pub mod http;
pub mod telemetry;
