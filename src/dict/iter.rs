//! Deterministic header enumeration.
//!
//! Iteration order is fixed regardless of insertion order: known headers by
//! ascending bit index (cleared and pseudo bits skipped), then the
//! Content-Length entry when present, then unknown headers in insertion
//! order. Two dictionaries holding the same headers enumerate identically.

use bytes::Bytes;

use crate::gen::DirectionPlan;

use super::{HeaderValues, Slot};

/// Iterator over `(name, values)` pairs of a dictionary.
pub struct HeaderIter<'a> {
    plan: &'static DirectionPlan,
    slots: &'a [Slot],
    unknown: std::slice::Iter<'a, (String, Vec<Bytes>)>,
    remaining: u64,
    /// Taken when its turn comes; the response direction reaches it through
    /// the pinned bit, the request direction after the known walk.
    content_length: Option<u64>,
}

impl<'a> HeaderIter<'a> {
    pub(crate) fn new(
        plan: &'static DirectionPlan,
        slots: &'a [Slot],
        unknown: &'a [(String, Vec<Bytes>)],
        bits: u64,
        content_length: Option<u64>,
    ) -> Self {
        Self {
            plan,
            slots,
            unknown: unknown.iter(),
            remaining: bits & !plan.pseudo_bits(),
            content_length,
        }
    }

    fn content_length_entry(&mut self) -> Option<(&'a str, HeaderValues)> {
        let value = self.content_length.take()?;
        let position = self.plan.content_length_position()?;
        let name = self.plan.header_at(position).name();
        Some((name, HeaderValues::single(Bytes::from(value.to_string()))))
    }
}

impl<'a> Iterator for HeaderIter<'a> {
    type Item = (&'a str, HeaderValues);

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining != 0 {
            let index = self.remaining.trailing_zeros() as usize;
            self.remaining &= self.remaining - 1;
            if index >= self.slots.len() {
                // the pinned Content-Length bit
                if let Some(entry) = self.content_length_entry() {
                    return Some(entry);
                }
                continue;
            }
            let header = self.plan.header_at(index);
            return Some((header.name(), HeaderValues::from_slice(&self.slots[index].values)));
        }

        if let Some(entry) = self.content_length_entry() {
            return Some(entry);
        }

        self.unknown
            .next()
            .map(|(name, values)| (name.as_str(), HeaderValues::from_slice(values)))
    }
}
