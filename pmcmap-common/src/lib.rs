//! # PMCMAP Common Library
//!
//! Shared code for the pmcmap crates:
//! - Error and result types
//! - Configuration loading and resolution

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
