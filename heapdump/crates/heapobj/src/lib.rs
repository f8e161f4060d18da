//! # heapobj - Compact Object Records for Heap Dump Analysis
//!
//! Analyzing a dump of a large process means holding tens of millions of
//! object records in memory at once. `heapobj` keeps each record small so the
//! analysis does not need more memory than the process that was dumped.
//!
//! ## Overview
//!
//! - **Reference lists**: outgoing and incoming addresses live in one
//!   count-prefixed block per list, behind a single thin pointer
//!   ([`refs::RefList`])
//! - **Object records**: identity, type, size, optional length/value/name,
//!   and the two reference lists ([`MemObject`])
//! - **Type-label interning**: equal type names share one allocation
//!   ([`heapdump_util::TypeInterner`])
//! - **Bounded formatting**: diagnostics show at most ten addresses per list
//!   ([`refs::RefPreview`])
//!
//! On top of the records, [`ObjectTable`] holds one dump's population and
//! runs the passes that need all of it: inverting references into referrers,
//! cutting references into modules/frames/types, and per-type summaries.
//!
//! ## Quick Start
//!
//! ```rust
//! use heapobj::{DumpConfig, MemObject, ObjectTable};
//!
//! fn main() -> Result<(), heapobj::DumpError> {
//!     let mut table = ObjectTable::new(DumpConfig::default())?;
//!
//!     table.insert(MemObject::new(0x1000, "dict", 248, &[0x2000, 0x2008])?.with_length(2))?;
//!     table.insert(MemObject::new(0x2000, "str", 41, &[])?.with_value("key"))?;
//!     table.insert(MemObject::new(0x2008, "int", 24, &[])?.with_value(7i64))?;
//!
//!     table.compute_referrers()?;
//!     assert_eq!(table.require(0x2000)?.referrers(), vec![0x1000]);
//!
//!     println!("{}", table.summarize());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: table configuration and validation
//! - [`error`]: error types
//! - [`logging`]: pass events rendered through `log`
//! - [`object`]: the object record
//! - [`refs`]: reference-list codec and bounded formatter
//! - [`summary`]: per-type statistics
//! - [`table`]: a dump's record population and its passes

pub mod config;
pub mod error;
pub mod logging;
pub mod object;
pub mod refs;
pub mod summary;
pub mod table;

// Re-export main types for convenience
pub use config::{ConfigError, DumpConfig};
pub use error::{DumpError, Result};
pub use heapdump_util::{LabelRegistry, TypeInterner, TypeLabel};
pub use object::{MemObject, ObjValue, NO_LENGTH};
pub use refs::{format_refs, RefList, MAX_PREVIEW_REFS};
pub use summary::{ObjSummary, TypeSummary};
pub use table::ObjectTable;

/// heapobj version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
