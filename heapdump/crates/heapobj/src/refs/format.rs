//! Bounded rendering of reference lists for diagnostics.

use std::fmt;

use super::RefList;

/// Maximum number of addresses shown before the list is cut off
pub const MAX_PREVIEW_REFS: usize = 10;

/// Display adapter that renders at most [`MAX_PREVIEW_REFS`] addresses
///
/// - absent list: empty text
/// - up to the cap: `[a, b, c]`
/// - over the cap: the first ten, then `, ...]`
///
/// Addresses are printed in decimal. Rendering only reads the list.
#[derive(Clone, Copy)]
pub struct RefPreview<'a> {
    refs: &'a RefList,
}

impl<'a> RefPreview<'a> {
    pub fn new(refs: &'a RefList) -> Self {
        Self { refs }
    }
}

impl fmt::Display for RefPreview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.refs.is_empty() {
            return Ok(());
        }

        f.write_str("[")?;
        for (i, address) in self.refs.iter().take(MAX_PREVIEW_REFS).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", address)?;
        }

        if self.refs.len() > MAX_PREVIEW_REFS {
            f.write_str(", ...]")
        } else {
            f.write_str("]")
        }
    }
}

/// Render `refs` to an owned string, see [`RefPreview`]
pub fn format_refs(refs: &RefList) -> String {
    RefPreview::new(refs).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(n: u64) -> RefList {
        let addresses: Vec<u64> = (1..=n).collect();
        RefList::encode(&addresses).unwrap()
    }

    #[test]
    fn test_absent_renders_empty() {
        assert_eq!(format_refs(&RefList::empty()), "");
    }

    #[test]
    fn test_single() {
        assert_eq!(format_refs(&refs(1)), "[1]");
    }

    #[test]
    fn test_exactly_at_cap() {
        assert_eq!(format_refs(&refs(10)), "[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]");
    }

    #[test]
    fn test_one_over_cap() {
        assert_eq!(
            format_refs(&refs(11)),
            "[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, ...]"
        );
    }

    #[test]
    fn test_repeated_rendering_is_stable() {
        let list = refs(25);
        let preview = list.preview();
        assert_eq!(preview.to_string(), preview.to_string());
        assert_eq!(list.len(), 25);
    }
}
