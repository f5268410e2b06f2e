//! Infrastructure layer for LifeStream.
//!
//! Owns everything that touches the process environment: YAML
//! configuration loading and validation, logging bootstrap, and the
//! composition root that wires providers into application services.

pub mod bootstrap;
pub mod config;
pub mod logging;

pub use bootstrap::AppContext;
pub use config::{AppConfig, ConfigLoader};
