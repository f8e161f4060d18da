//! Per-type size statistics over a dump's records.

use heapdump_util::TypeLabel;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

use crate::object::MemObject;

const MIB: f64 = 1024.0 * 1024.0;

/// Information about a given type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummary {
    pub type_str: TypeLabel,
    pub count: u64,
    pub total_size: u64,
    /// Sum of squared sizes, for the standard deviation
    pub sq_sum: u128,
    pub max_size: u64,
    pub max_address: Option<u64>,
}

impl TypeSummary {
    pub fn new(type_str: TypeLabel) -> Self {
        Self {
            type_str,
            count: 0,
            total_size: 0,
            sq_sum: 0,
            max_size: 0,
            max_address: None,
        }
    }

    pub fn add(&mut self, obj: &MemObject) {
        let size = obj.size();
        self.count += 1;
        self.total_size += size;
        self.sq_sum += u128::from(size) * u128::from(size);
        if size > self.max_size || self.max_address.is_none() {
            self.max_size = size;
            self.max_address = Some(obj.address());
        }
    }

    /// Mean object size, 0 for an empty summary
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_size as f64 / self.count as f64
        }
    }

    /// Population standard deviation of object sizes
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let avg = self.average();
        let exp_x2 = self.sq_sum as f64 / self.count as f64;
        (exp_x2 - avg * avg).max(0.0).sqrt()
    }
}

impl fmt::Display for TypeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}, {} bytes, {:.3} avg bytes, {:.3} std dev, {} max",
            self.type_str,
            self.count,
            self.total_size,
            self.average(),
            self.std_dev(),
            self.max_size
        )?;
        match self.max_address {
            Some(address) => write!(f, " @ {}", address),
            None => Ok(()),
        }
    }
}

/// Summary statistics over a set of records
///
/// `Display` renders the largest types as a table; `to_json` emits every
/// type.
#[derive(Debug, Clone, Serialize)]
pub struct ObjSummary {
    #[serde(skip)]
    type_summaries: IndexMap<TypeLabel, TypeSummary>,
    pub total_count: u64,
    pub total_size: u64,
    #[serde(skip)]
    rows: usize,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    total_count: u64,
    total_size: u64,
    types: Vec<&'a TypeSummary>,
}

impl ObjSummary {
    /// Create an empty summary whose report shows at most `rows` types
    pub fn new(rows: usize) -> Self {
        Self {
            type_summaries: IndexMap::new(),
            total_count: 0,
            total_size: 0,
            rows,
        }
    }

    pub fn add(&mut self, obj: &MemObject) {
        self.type_summaries
            .entry(obj.type_str().clone())
            .or_insert_with(|| TypeSummary::new(obj.type_str().clone()))
            .add(obj);
        self.total_count += 1;
        self.total_size += obj.size();
    }

    /// Number of distinct types seen
    pub fn type_count(&self) -> usize {
        self.type_summaries.len()
    }

    pub fn get(&self, type_str: &str) -> Option<&TypeSummary> {
        self.type_summaries.get(type_str)
    }

    /// Type summaries, largest total size first, ties broken by count
    pub fn by_size(&self) -> Vec<&TypeSummary> {
        let mut summaries: Vec<&TypeSummary> = self.type_summaries.values().collect();
        summaries.sort_by(|a, b| (b.total_size, b.count).cmp(&(a.total_size, a.count)));
        summaries
    }

    /// Render every type summary, largest first, as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&SummaryReport {
            total_count: self.total_count,
            total_size: self.total_size,
            types: self.by_size(),
        })
    }
}

fn percent(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        0
    } else {
        (part as f64 * 100.0 / whole as f64) as u64
    }
}

impl fmt::Display for ObjSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summaries = self.by_size();
        writeln!(
            f,
            "Total {} objects, {} types, Total size = {:.1}MiB ({} bytes)",
            self.total_count,
            summaries.len(),
            self.total_size as f64 / MIB,
            self.total_size
        )?;
        write!(f, " Index   Count   %      Size   % Cum     Max Kind")?;

        let mut cumulative = 0;
        for (i, summary) in summaries.iter().take(self.rows).enumerate() {
            cumulative += summary.total_size;
            write!(
                f,
                "\n{:6}{:8}{:4}{:10}{:4}{:4}{:8} {}",
                i,
                summary.count,
                percent(summary.count, self.total_count),
                summary.total_size,
                percent(summary.total_size, self.total_size),
                percent(cumulative, self.total_size),
                summary.max_size,
                summary.type_str
            )?;
        }
        Ok(())
    }
}
