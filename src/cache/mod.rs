//! Cache module - Manages the flat-text package cache
//!
//! Provides:
//! - Freshness policy (missing, forced, older than 24 hours)
//! - Atomic refresh from the package lister

pub mod store;
