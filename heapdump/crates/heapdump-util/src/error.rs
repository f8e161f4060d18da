//! Core error types for heapdump-util crate
//!
//! This module defines error types used throughout the util crate.

use thiserror::Error;

/// Error type for type-label interning operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InternError {
    /// The label was looked up but has never been interned
    #[error("Type label not interned: {0:?}")]
    NotInterned(String),
}

/// Result type alias for interning operations
pub type InternResult<T> = std::result::Result<T, InternError>;
