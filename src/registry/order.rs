//! Ordering policy shared by the bit layout, the matcher cascade and the
//! enumeration order: primary headers first, then names in invariant
//! lexicographic order.

use std::cmp::Ordering;

use super::HeaderDef;

/// Total order over registry rows: `primary` descending, then
/// [`invariant_cmp`] over the wire name.
pub fn compare(a: &HeaderDef, b: &HeaderDef) -> Ordering {
    b.is_primary()
        .cmp(&a.is_primary())
        .then_with(|| invariant_cmp(a.name, b.name))
}

/// Culture-invariant name compare. All registry names are ASCII, where
/// invariant ordering is a case-insensitive byte compare; equal folded names
/// fall back to the exact spelling so the order stays total.
pub fn invariant_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .bytes()
        .map(|b| b.to_ascii_lowercase())
        .cmp(b.bytes().map(|b| b.to_ascii_lowercase()));
    folded.then_with(|| a.cmp(b))
}
