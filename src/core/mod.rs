//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Shared model (MatchLevel, Span, MatchResult, SearchError)
//! - Rendering for text and jsonl output
//! - Cache path resolution
//! - Logging setup
//! - Common utilities

pub mod logger;
pub mod model;
pub mod paths;
pub mod render;
pub mod util;
