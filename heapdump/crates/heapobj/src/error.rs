//! Error Module - heapobj Error Types
//!
//! # Error Categories
//!
//! ## Memory Errors
//! - `AllocationFailed` - a reference-list block could not be allocated
//!
//! ## Table Errors
//! - `DuplicateAddress` - two records claim the same address
//! - `UnknownAddress` - a lookup that requires a record found none
//!
//! ## Configuration Errors
//! - `Configuration` - invalid [`DumpConfig`](crate::config::DumpConfig)
//!
//! Supplying an address wider than the native pointer width is a caller
//! contract violation and panics; it is not represented here.

use heapdump_util::InternError;
use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for all heapobj operations
#[derive(Debug, Error)]
pub enum DumpError {
    /// Allocation of a reference-list block failed
    ///
    /// **When returned:** the allocator returned null, or `slots` words do
    /// not form a valid layout
    ///
    /// **Recovery strategy:** abort construction of the record; a list field
    /// whose replacement failed is left empty
    #[error("Allocation failed: could not allocate a block of {slots} slots")]
    AllocationFailed { slots: usize },

    /// A record with this address is already in the table
    #[error("Duplicate object address: {address:#x}")]
    DuplicateAddress { address: u64 },

    /// No record with this address is in the table
    #[error("Unknown object address: {address:#x}")]
    UnknownAddress { address: u64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Type-label registry error
    #[error("Interning error: {0}")]
    Intern(#[from] InternError),
}

impl DumpError {
    /// Check if this error means the machine ran out of memory
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, DumpError::AllocationFailed { .. })
    }
}

/// Result type alias for heapobj operations
pub type Result<T> = std::result::Result<T, DumpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats_address_as_hex() {
        let err = DumpError::DuplicateAddress { address: 0x1000 };
        assert_eq!(err.to_string(), "Duplicate object address: 0x1000");
    }

    #[test]
    fn test_resource_exhaustion() {
        assert!(DumpError::AllocationFailed { slots: 3 }.is_resource_exhaustion());
        assert!(!DumpError::UnknownAddress { address: 1 }.is_resource_exhaustion());
    }

    #[test]
    fn test_from_config_error() {
        let err: DumpError = ConfigError::InvalidSummaryRows("zero".to_string()).into();
        assert!(matches!(err, DumpError::Configuration(_)));
    }
}
