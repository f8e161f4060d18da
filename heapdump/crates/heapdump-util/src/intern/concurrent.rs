//! Type-label registry for builders that populate a dump from several threads.
//!
//! Same contract as [`TypeInterner`](super::TypeInterner), but every method
//! takes `&self`. Backed by a `DashMap` with `ahash`, so writers on different
//! shards do not block each other.

use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{InternerStats, LabelRegistry, TypeLabel};

/// Thread-safe type-label registry
#[derive(Debug)]
pub struct ConcurrentTypeInterner {
    map: DashMap<TypeLabel, (), RandomState>,

    /// Number of requests that found an existing label
    hits: AtomicUsize,

    /// Number of requests that registered a new label
    misses: AtomicUsize,
}

impl Default for ConcurrentTypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcurrentTypeInterner {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create an empty registry sized for `capacity` distinct labels
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: DashMap::with_capacity_and_hasher(capacity, RandomState::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Intern label text
    ///
    /// Two threads racing on the same new text both get the instance that
    /// won the insert.
    pub fn intern(&self, label: &str) -> TypeLabel {
        // Fast path: already registered
        if let Some(entry) = self.map.get(label) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(entry.key());
        }
        self.insert_slow(Arc::from(label))
    }

    /// Canonicalize an existing label instance through a shared reference
    pub fn intern_shared(&self, label: &TypeLabel) -> TypeLabel {
        if let Some(entry) = self.map.get(label.as_ref()) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(entry.key());
        }
        self.insert_slow(Arc::clone(label))
    }

    fn insert_slow(&self, label: TypeLabel) -> TypeLabel {
        self.misses.fetch_add(1, Ordering::Relaxed);
        let entry = self.map.entry(label).or_insert(());
        Arc::clone(entry.key())
    }

    /// Look up the canonical instance without registering anything
    pub fn get(&self, label: &str) -> Option<TypeLabel> {
        self.map.get(label).map(|entry| Arc::clone(entry.key()))
    }

    /// Number of distinct labels
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check whether no label has been registered yet
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Snapshot of the registry counters
    ///
    /// Counters are read with relaxed ordering and may lag concurrent
    /// interning.
    pub fn stats(&self) -> InternerStats {
        InternerStats {
            count: self.map.len(),
            capacity: self.map.capacity(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl LabelRegistry for ConcurrentTypeInterner {
    fn canonical(&mut self, label: &TypeLabel) -> TypeLabel {
        self.intern_shared(label)
    }
}

impl LabelRegistry for &ConcurrentTypeInterner {
    fn canonical(&mut self, label: &TypeLabel) -> TypeLabel {
        self.intern_shared(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_intern_same_string() {
        let interner = ConcurrentTypeInterner::new();
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_intern_shared_adopts_instance() {
        let interner = ConcurrentTypeInterner::new();
        let label: TypeLabel = Arc::from("frame");
        let canonical = interner.intern_shared(&label);
        assert!(Arc::ptr_eq(&label, &canonical));
        assert!(Arc::ptr_eq(&label, &interner.intern("frame")));
    }

    #[test]
    fn test_concurrent_same_string() {
        let interner = Arc::new(ConcurrentTypeInterner::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let interner = Arc::clone(&interner);
                thread::spawn(move || interner.intern("concurrent_same"))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for label in &results[1..] {
            assert!(Arc::ptr_eq(&results[0], label));
        }
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_concurrent_distinct_strings() {
        let interner = Arc::new(ConcurrentTypeInterner::new());
        let handles: Vec<_> = (0..20)
            .map(|i| {
                let interner = Arc::clone(&interner);
                thread::spawn(move || {
                    for j in 0..50 {
                        interner.intern(&format!("type_{}", (i * 50 + j) % 100));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(interner.len(), 100);
        let stats = interner.stats();
        assert_eq!(stats.hits + stats.misses, 1000);
    }

    #[test]
    fn test_registry_through_shared_ref() {
        let interner = ConcurrentTypeInterner::new();
        let mut registry = &interner;
        let label: TypeLabel = Arc::from("module");
        let canonical = registry.canonical(&label);
        assert!(Arc::ptr_eq(&canonical, &label));
        assert!(interner.get("module").is_some());
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConcurrentTypeInterner>();
    }
}
