//! Type-label interning
//!
//! Dump records carry a type label such as `"dict"` or `"str"`. The same few
//! thousand labels repeat across millions of records, so each record holds a
//! [`TypeLabel`] (an `Arc<str>`) and a registry makes sure equal labels share
//! one allocation.
//!
//! # Example
//!
//! ```rust
//! use heapdump_util::intern::TypeInterner;
//! use std::sync::Arc;
//!
//! let mut interner = TypeInterner::new();
//! let a = interner.intern("dict");
//! let b = interner.intern(&String::from("dict"));
//! assert!(Arc::ptr_eq(&a, &b));
//! ```

mod concurrent;

pub use concurrent::ConcurrentTypeInterner;

use ahash::RandomState;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{InternError, InternResult};

/// Shared, immutable type label.
pub type TypeLabel = Arc<str>;

/// Something that can hand out the canonical instance of a label.
///
/// The object record interns through this trait so it does not care whether
/// the registry is single-writer or concurrent.
pub trait LabelRegistry {
    /// Return the canonical instance for `label`'s text.
    ///
    /// If the text is not yet registered, `label` itself becomes the
    /// canonical instance.
    fn canonical(&mut self, label: &TypeLabel) -> TypeLabel;
}

/// Statistics about an interning registry
///
/// # Fields
///
/// * `count` - Number of distinct labels
/// * `capacity` - Table capacity
/// * `hits` - Number of times an already-registered label was requested
/// * `misses` - Number of times a new label was registered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InternerStats {
    pub count: usize,
    pub capacity: usize,
    pub hits: usize,
    pub misses: usize,
}

impl InternerStats {
    /// Fraction of requests that found an existing label (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Ratio of labels to table capacity
    pub fn load_factor(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.count as f64 / self.capacity as f64
        }
    }
}

/// Single-writer type-label registry
///
/// Created empty by whatever owns a dump's records, grows as records intern
/// their labels, never shrinks.
#[derive(Debug, Default)]
pub struct TypeInterner {
    table: HashSet<TypeLabel, RandomState>,
    hits: usize,
    misses: usize,
}

impl TypeInterner {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry sized for `capacity` distinct labels
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: HashSet::with_capacity_and_hasher(capacity, RandomState::new()),
            hits: 0,
            misses: 0,
        }
    }

    /// Intern label text, allocating a new canonical instance on first sight
    pub fn intern(&mut self, label: &str) -> TypeLabel {
        if let Some(existing) = self.table.get(label) {
            self.hits += 1;
            return Arc::clone(existing);
        }
        self.misses += 1;
        let interned: TypeLabel = Arc::from(label);
        self.table.insert(Arc::clone(&interned));
        interned
    }

    /// Look up the canonical instance without registering anything
    pub fn get(&self, label: &str) -> Option<TypeLabel> {
        self.table.get(label).map(Arc::clone)
    }

    /// Like [`TypeInterner::get`], but absence is an error
    pub fn resolve(&self, label: &str) -> InternResult<TypeLabel> {
        self.get(label)
            .ok_or_else(|| InternError::NotInterned(label.to_string()))
    }

    /// Check whether `label` has been registered
    pub fn contains(&self, label: &str) -> bool {
        self.table.contains(label)
    }

    /// Number of distinct labels
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check whether no label has been registered yet
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Iterate over the registered labels in no particular order
    pub fn labels(&self) -> impl Iterator<Item = &TypeLabel> {
        self.table.iter()
    }

    /// Snapshot of the registry counters
    pub fn stats(&self) -> InternerStats {
        InternerStats {
            count: self.table.len(),
            capacity: self.table.capacity(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

impl LabelRegistry for TypeInterner {
    fn canonical(&mut self, label: &TypeLabel) -> TypeLabel {
        if let Some(existing) = self.table.get(label.as_ref()) {
            self.hits += 1;
            return Arc::clone(existing);
        }
        self.misses += 1;
        self.table.insert(Arc::clone(label));
        Arc::clone(label)
    }
}
