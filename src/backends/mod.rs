//! Backends module - External tool integrations
//!
//! Provides:
//! - lister: runs the package listing command that feeds the cache

pub mod lister;
