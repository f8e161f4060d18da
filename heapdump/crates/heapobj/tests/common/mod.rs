//! Shared fixtures for the heapobj integration tests.

#![allow(dead_code)]

use heapobj::{DumpConfig, MemObject, ObjectTable};

/// Table with the default configuration
pub fn empty_table() -> ObjectTable {
    ObjectTable::new(DumpConfig::default()).expect("default config must validate")
}

/// Shorthand for a record without length, value or name
pub fn obj(address: u64, type_str: &str, size: u64, refs: &[u64]) -> MemObject {
    MemObject::new(address, type_str, size, refs).expect("small reference lists must allocate")
}

/// Table built from `(address, type, size, refs)` tuples
pub fn table_of(entries: &[(u64, &str, u64, &[u64])]) -> ObjectTable {
    let mut table = empty_table();
    for &(address, type_str, size, refs) in entries {
        table
            .insert(obj(address, type_str, size, refs))
            .expect("fixture addresses must be unique");
    }
    table
}

/// References of the record at `address`
pub fn refs_of(table: &ObjectTable, address: u64) -> Vec<u64> {
    table
        .get(address)
        .unwrap_or_else(|| panic!("no object at {:#x}", address))
        .references()
}

/// Referrers of the record at `address`
pub fn referrers_of(table: &ObjectTable, address: u64) -> Vec<u64> {
    table
        .get(address)
        .unwrap_or_else(|| panic!("no object at {:#x}", address))
        .referrers()
}
