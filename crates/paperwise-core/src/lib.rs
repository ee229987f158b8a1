//! # paperwise-core
//!
//! Core types, traits, and abstractions for the paperwise recommendation
//! engine.
//!
//! This crate provides the data model (profiles, candidates, recommendation
//! sets, cache entries), the collaborator traits the engine is written
//! against, the shared domain vocabulary and the workspace-wide defaults.

pub mod defaults;
pub mod domains;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use domains::{adjacent_domains, infer_domains, keywords_for, DomainMatch};
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
