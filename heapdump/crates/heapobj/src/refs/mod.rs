//! Reference List - compact storage for an object's outgoing or incoming
//! addresses
//!
//! A non-empty list is one heap block of `usize` slots. Slot 0 holds the
//! element count, the following slots hold the addresses in order. An empty
//! list owns no block at all, so a [`RefList`] is a single (nullable) thin
//! pointer.
//!
//! # Layout
//!
//! ```text
//! RefList ──► ┌─────────┬─────────┬─────────┬─────────┐
//!             │ slot 0  │ slot 1  │ slot 2  │ slot 3  │
//!             │ count=3 │ addr 0  │ addr 1  │ addr 2  │
//!             └─────────┴─────────┴─────────┴─────────┘
//!
//! RefList (empty) ──► null
//! ```
//!
//! # Example
//!
//! ```rust
//! use heapobj::refs::RefList;
//!
//! let refs = RefList::encode(&[0x2000, 0x2008])?;
//! assert_eq!(refs.len(), 2);
//! assert_eq!(refs.decode(), vec![0x2000, 0x2008]);
//!
//! let empty = RefList::encode(&[])?;
//! assert!(empty.is_empty());
//! assert!(empty.decode().is_empty());
//! # Ok::<(), heapobj::DumpError>(())
//! ```

mod format;

pub use format::{format_refs, RefPreview, MAX_PREVIEW_REFS};

use std::alloc::{self, Layout};
use std::fmt;
use std::mem;
use std::ptr::NonNull;
use std::slice;

use crate::error::{DumpError, Result};

/// Count-prefixed block of addresses, or nothing
pub struct RefList {
    block: Option<NonNull<usize>>,
}

// SAFETY: a RefList exclusively owns its block, exactly like a Box<[usize]>.
unsafe impl Send for RefList {}
unsafe impl Sync for RefList {}

impl RefList {
    /// The absent list
    #[inline]
    pub const fn empty() -> Self {
        Self { block: None }
    }

    /// Encode a sequence of addresses into a new block
    ///
    /// An empty sequence produces the absent list without allocating.
    ///
    /// # Panics
    ///
    /// Panics if an address does not fit in the native pointer width. Such
    /// an address cannot have come from this machine's dumps.
    ///
    /// # Errors
    ///
    /// [`DumpError::AllocationFailed`] if the block cannot be allocated; no
    /// partial block is kept.
    pub fn encode(addresses: &[u64]) -> Result<Self> {
        if addresses.is_empty() {
            return Ok(Self::empty());
        }
        for &address in addresses {
            assert_native_width(address);
        }

        let slots = addresses.len() + 1;
        let layout = block_layout(slots)?;
        // SAFETY: layout covers at least two words, so it is non-zero sized.
        let raw = unsafe { alloc::alloc(layout) }.cast::<usize>();
        let block = NonNull::new(raw).ok_or(DumpError::AllocationFailed { slots })?;

        // SAFETY: the block holds `slots` properly aligned words and every
        // write below stays within it.
        unsafe {
            let base = block.as_ptr();
            base.write(addresses.len());
            for (i, &address) in addresses.iter().enumerate() {
                base.add(i + 1).write(address as usize);
            }
        }

        Ok(Self { block: Some(block) })
    }

    /// Decode the block back into the original sequence
    pub fn decode(&self) -> Vec<u64> {
        self.iter().collect()
    }

    /// Number of addresses in the list, O(1)
    #[inline]
    pub fn len(&self) -> usize {
        match self.block {
            // SAFETY: a live block always starts with its count.
            Some(block) => unsafe { *block.as_ptr() },
            None => 0,
        }
    }

    /// Check whether the list is absent
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.block.is_none()
    }

    /// Borrow the stored addresses as native words
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        match self.block {
            // SAFETY: slots 1..=count are initialized and owned by self for
            // as long as the borrow lasts.
            Some(block) => unsafe {
                let base = block.as_ptr();
                slice::from_raw_parts(base.add(1), *base)
            },
            None => &[],
        }
    }

    /// Iterate over the addresses in order without decoding
    pub fn iter(&self) -> impl ExactSizeIterator<Item = u64> + '_ {
        self.as_slice().iter().map(|&slot| slot as u64)
    }

    /// Check whether `address` occurs in the list
    pub fn contains(&self, address: u64) -> bool {
        self.iter().any(|slot| slot == address)
    }

    /// Free the block
    ///
    /// Leaves the list absent. Releasing an absent list, or releasing twice,
    /// does nothing.
    pub fn release(&mut self) {
        if let Some(block) = self.block.take() {
            // SAFETY: the block was allocated by `encode` with exactly this
            // layout, and `take` guarantees it is freed only once.
            unsafe {
                let slots = *block.as_ptr() + 1;
                let layout = Layout::from_size_align_unchecked(
                    slots * mem::size_of::<usize>(),
                    mem::align_of::<usize>(),
                );
                alloc::dealloc(block.as_ptr().cast::<u8>(), layout);
            }
        }
    }

    /// Release the current block and install a freshly encoded one
    ///
    /// If encoding fails the list is left absent.
    pub fn replace(&mut self, addresses: &[u64]) -> Result<()> {
        self.release();
        *self = Self::encode(addresses)?;
        Ok(())
    }

    /// Deep copy into an independent block
    pub fn try_clone(&self) -> Result<Self> {
        Self::encode(&self.decode())
    }

    /// Bounded rendering for diagnostics, see [`RefPreview`]
    pub fn preview(&self) -> RefPreview<'_> {
        RefPreview::new(self)
    }
}

impl Default for RefList {
    fn default() -> Self {
        Self::empty()
    }
}

impl Drop for RefList {
    fn drop(&mut self) {
        self.release();
    }
}

impl PartialEq for RefList {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for RefList {}

impl fmt::Debug for RefList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl TryFrom<&[u64]> for RefList {
    type Error = DumpError;

    fn try_from(addresses: &[u64]) -> Result<Self> {
        Self::encode(addresses)
    }
}

fn block_layout(slots: usize) -> Result<Layout> {
    Layout::array::<usize>(slots).map_err(|_| DumpError::AllocationFailed { slots })
}

#[inline]
fn assert_native_width(address: u64) {
    assert!(
        usize::try_from(address).is_ok(),
        "address {:#x} does not fit in a {}-bit pointer",
        address,
        usize::BITS
    );
}
