//! Object Table - a dump's record population keyed by address
//!
//! The table owns the records and the dump's type-label registry. It also
//! hosts the whole-population passes that fill in what individual records
//! cannot know on their own:
//!
//! 1. [`compute_referrers`](ObjectTable::compute_referrers) inverts the
//!    reference graph.
//! 2. [`remove_expensive_references`](ObjectTable::remove_expensive_references)
//!    cuts references into objects that reach nearly everything.
//! 3. [`summarize`](ObjectTable::summarize) aggregates sizes per type.

use heapdump_util::{TypeInterner, TypeLabel};
use indexmap::map::Entry;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use std::hash::BuildHasherDefault;
use std::time::Instant;

use crate::config::DumpConfig;
use crate::error::{DumpError, Result};
use crate::logging::{self, DumpEvent};
use crate::object::MemObject;
use crate::summary::ObjSummary;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Address of the placeholder that stands in for removed references
pub const NULL_ADDRESS: u64 = 0;

/// Type label of the placeholder at [`NULL_ADDRESS`]
pub const NULL_TYPE: &str = "<ex-reference>";

const REFERRERS_PASS: &str = "compute referrers";
const EXPENSIVE_PASS: &str = "remove expensive refs";

/// All records of one dump, in insertion order
#[derive(Debug)]
pub struct ObjectTable {
    objs: FxIndexMap<u64, MemObject>,
    interner: TypeInterner,
    config: DumpConfig,
}

impl ObjectTable {
    /// Create an empty table
    ///
    /// # Errors
    ///
    /// [`DumpError::Configuration`] if `config` does not validate.
    pub fn new(config: DumpConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            objs: FxIndexMap::default(),
            interner: TypeInterner::new(),
            config,
        })
    }

    pub fn config(&self) -> &DumpConfig {
        &self.config
    }

    pub fn interner(&self) -> &TypeInterner {
        &self.interner
    }

    /// Canonical instance for `label`, for readers building records
    pub fn intern_label(&mut self, label: &str) -> TypeLabel {
        self.interner.intern(label)
    }

    pub fn len(&self) -> usize {
        self.objs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objs.is_empty()
    }

    pub fn contains(&self, address: u64) -> bool {
        self.objs.contains_key(&address)
    }

    pub fn get(&self, address: u64) -> Option<&MemObject> {
        self.objs.get(&address)
    }

    pub fn get_mut(&mut self, address: u64) -> Option<&mut MemObject> {
        self.objs.get_mut(&address)
    }

    /// Like [`get`](Self::get), but a missing record is an error
    pub fn require(&self, address: u64) -> Result<&MemObject> {
        self.get(address)
            .ok_or(DumpError::UnknownAddress { address })
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemObject> {
        self.objs.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MemObject> {
        self.objs.values_mut()
    }

    pub fn addresses(&self) -> impl Iterator<Item = u64> + '_ {
        self.objs.keys().copied()
    }

    /// Add a record, interning its type label
    ///
    /// # Errors
    ///
    /// [`DumpError::DuplicateAddress`] if a record with the same address is
    /// already present. The table is left unchanged.
    pub fn insert(&mut self, mut obj: MemObject) -> Result<()> {
        match self.objs.entry(obj.address()) {
            Entry::Occupied(_) => Err(DumpError::DuplicateAddress {
                address: obj.address(),
            }),
            Entry::Vacant(slot) => {
                obj.intern_type_label(&mut self.interner);
                slot.insert(obj);
                Ok(())
            }
        }
    }

    /// Add a record unless its address is taken
    ///
    /// Dumps occasionally list an object twice; the first entry wins.
    /// Returns whether the record was stored.
    pub fn insert_or_skip(&mut self, obj: MemObject) -> bool {
        self.insert(obj).is_ok()
    }

    /// Remove and return a record
    pub fn remove(&mut self, address: u64) -> Option<MemObject> {
        self.objs.shift_remove(&address)
    }

    /// Report the type-label registry counters through the log
    pub fn report_interning(&self) {
        let stats = self.interner.stats();
        logging::emit(&DumpEvent::InternStats {
            labels: stats.count,
            hits: stats.hits,
            misses: stats.misses,
        });
    }

    /// For each record, figure out who references it
    ///
    /// Referrers are listed in table order, once per reference, so an object
    /// that references another twice appears twice. Records nobody references
    /// end up with no referrers. Rerunning replaces earlier results.
    pub fn compute_referrers(&mut self) -> Result<()> {
        let start = Instant::now();
        let total = self.objs.len();
        logging::emit(&DumpEvent::PassStart {
            pass: REFERRERS_PASS,
            total,
        });

        let mut referrers: FxHashMap<u64, Vec<u64>> = FxHashMap::default();
        for (idx, obj) in self.objs.values().enumerate() {
            self.report_progress(REFERRERS_PASS, idx, total);
            for reference in obj.reference_list().iter() {
                referrers.entry(reference).or_default().push(obj.address());
            }
        }

        let mut changed = 0;
        for obj in self.objs.values_mut() {
            match referrers.remove(&obj.address()) {
                Some(list) => {
                    obj.set_referrers(&list)?;
                    changed += 1;
                }
                None => obj.clear_referrers(),
            }
        }

        logging::emit(&DumpEvent::PassEnd {
            pass: REFERRERS_PASS,
            total,
            changed,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        });
        Ok(())
    }

    /// Filter out references that drag the whole process into every object
    ///
    /// Any reference to a record of an expensive type (modules, frames and
    /// types by default) is removed and replaced by one trailing reference to
    /// the placeholder at [`NULL_ADDRESS`], which is inserted if missing.
    /// Function records lose their globals and module links (references 1
    /// and 2) the same way. LRU nodes lose their links to other LRU nodes.
    ///
    /// Returns the number of records whose references were rewritten.
    pub fn remove_expensive_references(&mut self) -> Result<usize> {
        let start = Instant::now();
        if !self.objs.contains_key(&NULL_ADDRESS) {
            let null_type = self.interner.intern(NULL_TYPE);
            let placeholder = MemObject::new(NULL_ADDRESS, null_type, 0, &[])?;
            self.objs.insert(NULL_ADDRESS, placeholder);
        }

        let total = self.objs.len();
        let total_steps = total * 2;
        logging::emit(&DumpEvent::PassStart {
            pass: EXPENSIVE_PASS,
            total,
        });

        // First pass: find the objects nobody should reference any more
        let mut noref_objs = FxHashSet::default();
        let mut lru_objs = FxHashSet::default();
        for (idx, obj) in self.objs.values().enumerate() {
            self.report_progress(EXPENSIVE_PASS, idx, total_steps);
            let type_str: &str = obj.type_str();
            if self.config.is_expensive(type_str) {
                noref_objs.insert(obj.address());
            }
            if type_str == self.config.lru_node_type {
                lru_objs.insert(obj.address());
            }
        }

        // Second pass: rewrite the records that point at them
        let config = &self.config;
        let mut changed = 0;
        for (idx, obj) in self.objs.values_mut().enumerate() {
            logging::progress(
                config.show_progress,
                config.progress_interval,
                EXPENSIVE_PASS,
                idx + total,
                total_steps,
            );

            let rewritten = if **obj.type_str() == *config.function_type {
                Some(strip_function_globals(obj.reference_list().as_slice()))
            } else if **obj.type_str() == *config.lru_node_type {
                Some(
                    obj.reference_list()
                        .iter()
                        .filter(|r| !lru_objs.contains(r))
                        .collect(),
                )
            } else if obj.reference_list().iter().any(|r| noref_objs.contains(&r)) {
                let mut kept: Vec<u64> = obj
                    .reference_list()
                    .iter()
                    .filter(|r| !noref_objs.contains(r))
                    .collect();
                kept.push(NULL_ADDRESS);
                Some(kept)
            } else {
                None
            };

            if let Some(references) = rewritten {
                obj.set_references(&references)?;
                changed += 1;
            }
        }

        logging::emit(&DumpEvent::PassEnd {
            pass: EXPENSIVE_PASS,
            total,
            changed,
            duration_ms: start.elapsed().as_secs_f64() * 1000.0,
        });
        Ok(changed)
    }

    /// Aggregate counts and sizes per type label
    pub fn summarize(&self) -> ObjSummary {
        let mut summary = ObjSummary::new(self.config.summary_rows);
        for obj in self.objs.values() {
            summary.add(obj);
        }
        summary
    }

    fn report_progress(&self, pass: &'static str, idx: usize, total: usize) {
        logging::progress(
            self.config.show_progress,
            self.config.progress_interval,
            pass,
            idx,
            total,
        );
    }
}

impl Extend<MemObject> for ObjectTable {
    /// Inserts every record, skipping duplicate addresses
    fn extend<I: IntoIterator<Item = MemObject>>(&mut self, iter: I) {
        for obj in iter {
            self.insert_or_skip(obj);
        }
    }
}

/// Function objects traverse as code, globals, module, defaults, doc, name,
/// dict, closure. Keep the code, drop globals and module, keep the rest and
/// point at the placeholder instead.
fn strip_function_globals(references: &[usize]) -> Vec<u64> {
    let head = references.len().min(1);
    let tail = references.len().min(3);
    references[..head]
        .iter()
        .chain(&references[tail..])
        .map(|&r| r as u64)
        .chain(std::iter::once(NULL_ADDRESS))
        .collect()
}
