//! heapdump-util - Foundation Types for Heap Dump Analysis
//!
//! ============================================================================
//! MODULE OVERVIEW
//! ============================================================================
//!
//! This crate holds the pieces shared by every stage of dump analysis that do
//! not depend on the object model itself. Today that is the type-label
//! interning registry and its error type.
//!
//! DESIGN PRINCIPLES:
//! ------------------
//! 1. MEMORY FIRST
//!    A dump of a large process contains tens of millions of objects but only
//!    a few thousand distinct type names. Every record should point at one
//!    shared copy of its type name instead of owning a private one.
//!
//! 2. CALLER-SCOPED STATE
//!    Registries are plain values owned by whoever owns a dump's record
//!    population. There is no global table; dropping the dump drops the
//!    registry with it.
//
// ============================================================================
// TYPE-LABEL INTERNING
// ============================================================================
//
// A registry maps label text to one canonical `Arc<str>`. Interning a label
// that is already present hands back a clone of the canonical pointer;
// interning a new label stores it. The registry only ever grows.
//
// Two flavours exist:
//
//   TypeInterner            single writer, `&mut self`, std `HashSet`
//   ConcurrentTypeInterner  many writers, `&self`, `DashMap`
//
// Both implement `LabelRegistry`, the seam the object record interns
// through.

pub mod error;
pub mod intern;

pub use error::{InternError, InternResult};
pub use intern::{ConcurrentTypeInterner, InternerStats, LabelRegistry, TypeInterner, TypeLabel};
