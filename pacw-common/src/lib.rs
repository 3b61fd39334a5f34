//! # PACW Common Library
//!
//! Shared code for the prior-authorization case workspace engine:
//! - Data-model types exchanged with the case service and template registry
//! - Error types
//! - Configuration loading

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
