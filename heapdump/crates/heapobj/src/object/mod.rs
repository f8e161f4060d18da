//! Object Module - one record per dumped heap object
//!
//! [`MemObject`] is deliberately passive. A dump reader constructs it, a
//! graph builder fills in [`referrers`](MemObject::set_referrers), and a size
//! aggregator writes [`total_size`](MemObject::total_size). None of that
//! work happens here.
//!
//! # Example
//!
//! ```rust
//! use heapobj::MemObject;
//!
//! let mut obj = MemObject::new(0x1000, "dict", 248, &[0x2000, 0x2008])?
//!     .with_length(2);
//! assert_eq!(obj.reference_count(), 2);
//! assert_eq!(obj.length(), Some(2));
//!
//! obj.set_referrers(&[0x500])?;
//! assert_eq!(
//!     obj.describe(),
//!     "MemObject(4096, dict, 248 bytes, 2 refs [8192, 8200], 1 referrers [1280])"
//! );
//! # Ok::<(), heapobj::DumpError>(())
//! ```

mod value;

pub use value::ObjValue;

use heapdump_util::{LabelRegistry, TypeLabel};
use std::fmt;

use crate::error::Result;
use crate::refs::RefList;

/// Stored in place of a length that was never supplied
///
/// Zero is a valid length, so absence needs its own value.
pub const NO_LENGTH: u64 = u64::MAX;

/// A single object captured from a heap dump
pub struct MemObject {
    /// Runtime address of the original object, unique within a dump
    address: u64,
    type_str: TypeLabel,
    /// Bytes used by the object itself, excluding what it references
    size: u64,
    /// Element count for containers, or [`NO_LENGTH`]
    length: u64,
    value: Option<ObjValue>,
    name: Option<Box<str>>,
    refs: RefList,
    referrers: RefList,

    /// Bytes transitively reachable from this object
    ///
    /// Zero means not computed. Written by an external aggregation pass.
    pub total_size: u64,
}

impl MemObject {
    /// Create a record for one parsed dump entry
    ///
    /// Length, value and name start absent; see the `with_*` methods.
    /// Referrers start absent and `total_size` starts at zero.
    ///
    /// # Panics
    ///
    /// Panics if a reference does not fit in the native pointer width.
    pub fn new(
        address: u64,
        type_str: impl Into<TypeLabel>,
        size: u64,
        references: &[u64],
    ) -> Result<Self> {
        Ok(Self {
            address,
            type_str: type_str.into(),
            size,
            length: NO_LENGTH,
            value: None,
            name: None,
            refs: RefList::encode(references)?,
            referrers: RefList::empty(),
            total_size: 0,
        })
    }

    /// Set the container length
    ///
    /// # Panics
    ///
    /// Panics if `length` equals [`NO_LENGTH`].
    pub fn with_length(mut self, length: u64) -> Self {
        assert!(length != NO_LENGTH, "length {} collides with the absent marker", length);
        self.length = length;
        self
    }

    /// Set the container length if one was supplied
    pub fn with_optional_length(self, length: Option<u64>) -> Self {
        match length {
            Some(length) => self.with_length(length),
            None => self,
        }
    }

    pub fn with_value(mut self, value: impl Into<ObjValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<Box<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    pub fn address(&self) -> u64 {
        self.address
    }

    #[inline]
    pub fn type_str(&self) -> &TypeLabel {
        &self.type_str
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Container length, `None` if the dump did not record one
    #[inline]
    pub fn length(&self) -> Option<u64> {
        (self.length != NO_LENGTH).then_some(self.length)
    }

    pub fn value(&self) -> Option<&ObjValue> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: Option<ObjValue>) {
        self.value = value;
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Addresses this object points to, in dump order
    pub fn references(&self) -> Vec<u64> {
        self.refs.decode()
    }

    /// Replace the outgoing references
    ///
    /// The previous block is released first. On allocation failure the
    /// object is left with no references.
    pub fn set_references(&mut self, references: &[u64]) -> Result<()> {
        self.refs.replace(references)
    }

    /// Borrow the outgoing references without decoding
    #[inline]
    pub fn reference_list(&self) -> &RefList {
        &self.refs
    }

    #[inline]
    pub fn reference_count(&self) -> usize {
        self.refs.len()
    }

    /// Addresses that point to this object
    ///
    /// Empty until a graph builder has run.
    pub fn referrers(&self) -> Vec<u64> {
        self.referrers.decode()
    }

    /// Replace the incoming references, releasing the previous block first
    pub fn set_referrers(&mut self, referrers: &[u64]) -> Result<()> {
        self.referrers.replace(referrers)
    }

    /// Drop the incoming references
    pub fn clear_referrers(&mut self) {
        self.referrers.release();
    }

    #[inline]
    pub fn referrer_list(&self) -> &RefList {
        &self.referrers
    }

    #[inline]
    pub fn referrer_count(&self) -> usize {
        self.referrers.len()
    }

    /// Swap the type label for the registry's canonical instance
    ///
    /// The label text does not change; only which allocation holds it.
    pub fn intern_type_label<R: LabelRegistry + ?Sized>(&mut self, registry: &mut R) {
        self.type_str = registry.canonical(&self.type_str);
    }

    /// Single-line summary for diagnostics
    ///
    /// `MemObject(address, type[, name], size bytes, n refs [..][, m referrers [..]])`
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MemObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemObject({}, {}", self.address, self.type_str)?;
        if let Some(name) = &self.name {
            write!(f, ", {}", name)?;
        }
        write!(f, ", {} bytes, {} refs", self.size, self.refs.len())?;
        if !self.refs.is_empty() {
            write!(f, " {}", self.refs.preview())?;
        }
        if !self.referrers.is_empty() {
            write!(
                f,
                ", {} referrers {}",
                self.referrers.len(),
                self.referrers.preview()
            )?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for MemObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemObject")
            .field("address", &format_args!("{:#x}", self.address))
            .field("type_str", &self.type_str)
            .field("size", &self.size)
            .field("length", &self.length())
            .field("value", &self.value)
            .field("name", &self.name)
            .field("refs", &self.refs)
            .field("referrers", &self.referrers)
            .field("total_size", &self.total_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapdump_util::TypeInterner;
    use std::sync::Arc;

    fn dict() -> MemObject {
        MemObject::new(0x1000, "dict", 248, &[0x2000, 0x2008])
            .unwrap()
            .with_length(2)
    }

    #[test]
    fn test_new_defaults() {
        let obj = MemObject::new(1, "int", 24, &[]).unwrap();
        assert_eq!(obj.address(), 1);
        assert_eq!(&**obj.type_str(), "int");
        assert_eq!(obj.size(), 24);
        assert_eq!(obj.length(), None);
        assert_eq!(obj.value(), None);
        assert_eq!(obj.name(), None);
        assert_eq!(obj.reference_count(), 0);
        assert_eq!(obj.referrer_count(), 0);
        assert!(obj.referrers().is_empty());
        assert_eq!(obj.total_size, 0);
    }

    #[test]
    fn test_zero_length_is_not_absent() {
        let with_zero = MemObject::new(1, "list", 40, &[]).unwrap().with_length(0);
        let without = MemObject::new(2, "list", 40, &[]).unwrap();
        assert_eq!(with_zero.length(), Some(0));
        assert_eq!(without.length(), None);
        assert_eq!(with_zero.with_optional_length(None).length(), Some(0));
    }

    #[test]
    #[should_panic(expected = "absent marker")]
    fn test_sentinel_length_rejected() {
        let _ = MemObject::new(1, "list", 40, &[]).unwrap().with_length(NO_LENGTH);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_full_width_address() {
        let obj = MemObject::new(u64::MAX, "object", 16, &[1 << 63]).unwrap();
        assert_eq!(obj.address(), u64::MAX);
        assert_eq!(obj.references(), vec![1 << 63]);
    }

    #[test]
    fn test_reassign_references() {
        let mut obj = dict();
        obj.set_references(&[1, 2, 3]).unwrap();
        assert_eq!(obj.references(), vec![1, 2, 3]);
        assert_eq!(obj.reference_count(), 3);

        obj.set_references(&[]).unwrap();
        assert_eq!(obj.reference_count(), 0);
        assert!(obj.reference_list().is_empty());
    }

    #[test]
    fn test_referrers_lifecycle() {
        let mut obj = dict();
        obj.set_referrers(&[0x500, 0x600]).unwrap();
        assert_eq!(obj.referrers(), vec![0x500, 0x600]);
        assert_eq!(obj.referrer_count(), 2);

        obj.clear_referrers();
        assert_eq!(obj.referrer_count(), 0);
    }

    #[test]
    fn test_value_and_name() {
        let mut obj = MemObject::new(3, "str", 41, &[])
            .unwrap()
            .with_value("abc")
            .with_name("greeting");
        assert_eq!(obj.value().and_then(ObjValue::as_str), Some("abc"));
        assert_eq!(obj.name(), Some("greeting"));

        obj.set_value(Some(ObjValue::Int(7)));
        assert_eq!(obj.value().and_then(ObjValue::as_int), Some(7));
    }

    #[test]
    fn test_describe_without_referrers() {
        let text = dict().describe();
        assert_eq!(text, "MemObject(4096, dict, 248 bytes, 2 refs [8192, 8200])");
        assert!(!text.contains("referrers"));
    }

    #[test]
    fn test_describe_with_name_and_no_refs() {
        let obj = MemObject::new(10, "module", 56, &[]).unwrap().with_name("os");
        assert_eq!(obj.describe(), "MemObject(10, module, os, 56 bytes, 0 refs)");
    }

    #[test]
    fn test_describe_truncates_long_lists() {
        let refs: Vec<u64> = (0..12).collect();
        let obj = MemObject::new(5, "tuple", 120, &refs).unwrap();
        assert_eq!(
            obj.describe(),
            "MemObject(5, tuple, 120 bytes, 12 refs [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, ...])"
        );
    }

    #[test]
    fn test_intern_type_label() {
        let mut interner = TypeInterner::new();
        let mut a = MemObject::new(1, String::from("dict"), 8, &[]).unwrap();
        let mut b = MemObject::new(2, String::from("dict"), 8, &[]).unwrap();
        assert!(!Arc::ptr_eq(a.type_str(), b.type_str()));

        a.intern_type_label(&mut interner);
        b.intern_type_label(&mut interner);
        assert!(Arc::ptr_eq(a.type_str(), b.type_str()));
        assert_eq!(&**b.type_str(), "dict");
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_debug_shows_hex_address() {
        let text = format!("{:?}", dict());
        assert!(text.contains("address: 0x1000"));
        assert!(text.contains("length: Some(2)"));
    }
}
