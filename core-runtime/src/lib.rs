//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the media-library core:
//! - Configuration management and capability resolution
//! - Logging and tracing infrastructure
//!
//! ## Overview
//!
//! Every other core crate reads its settings from a [`config::CoreConfig`]
//! built here, and logs through the `tracing` subscriber installed by
//! [`logging::init_logging`].

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Capabilities, CoreConfig, CoreConfigBuilder, FeatureFlags};
pub use error::{Error, Result};
