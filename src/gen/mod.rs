//! Per-direction plans composed from the registry.
//!
//! A [`DirectionPlan`] bundles everything a dictionary of that direction
//! needs: the bit layout, the synthesized name matcher, the pre-encoded wire
//! blob, the HPACK dispatch (request only) and the invalid-under-H2/H3 mask
//! (response only). The three plans are built once, at first use, from the
//! registry alone; construction asserts the registry invariants so a
//! malformed table fails loudly instead of producing a wrong dictionary.

pub mod emit;
pub mod hpack;
pub mod matcher;

mod layout;
mod wire;

use std::sync::LazyLock;

use bytes::Bytes;

use crate::registry::{ident, order, Direction, HeaderDef, KnownHeader};

pub use hpack::{HpackDispatch, HpackGroup, StaticEntry, STATIC_TABLE};
pub use matcher::NameMatcher;
pub use wire::WireSlice;

/// A registry row placed into a direction: its bit index and wire slice.
#[derive(Debug, Clone, Copy)]
pub struct PlannedHeader {
    pub def: &'static HeaderDef,
    /// Bit position in the presence word. `None` for the request direction's
    /// Content-Length, which is stored outside the word.
    pub index: Option<u8>,
    /// Slice into the direction's wire blob; serialized directions only.
    pub wire: Option<WireSlice>,
}

impl PlannedHeader {
    pub fn name(&self) -> &'static str {
        self.def.name
    }

    pub fn known(&self) -> KnownHeader {
        self.def.known
    }

    pub fn bit(&self) -> Option<u64> {
        self.index.map(|i| 1u64 << i)
    }
}

/// The complete build-time product for one direction.
#[derive(Debug)]
pub struct DirectionPlan {
    direction: Direction,
    /// Bit index `i` lives at position `i`; Content-Length, when present, is
    /// the final position regardless of its index.
    headers: Vec<PlannedHeader>,
    /// `KnownHeader as usize` to plan position.
    positions: Vec<Option<u16>>,
    matcher: NameMatcher,
    wire_blob: Bytes,
    invalid_h2h3_bits: u64,
    pseudo_bits: u64,
    hpack: Option<HpackDispatch>,
    content_length_position: Option<usize>,
    slot_count: usize,
}

impl DirectionPlan {
    fn build(direction: Direction) -> Self {
        let layout::Layout { ordered, content_length, invalid_h2h3_bits, pseudo_bits } =
            layout::plan(direction);

        let mut headers: Vec<PlannedHeader> = ordered
            .iter()
            .enumerate()
            .map(|(i, def)| PlannedHeader { def, index: Some(i as u8), wire: None })
            .collect();
        let slot_count = headers.len();

        let mut content_length_position = None;
        if let Some(def) = content_length {
            let index = match direction {
                Direction::Response => Some(63),
                _ => None,
            };
            content_length_position = Some(headers.len());
            headers.push(PlannedHeader { def, index, wire: None });
        }

        let wire_blob = match direction {
            Direction::Request => Bytes::new(),
            Direction::Response | Direction::Trailers => {
                let defs: Vec<&'static HeaderDef> = headers.iter().map(|h| h.def).collect();
                let (blob, slices) = wire::build_blob(&defs);
                for (header, slice) in headers.iter_mut().zip(slices) {
                    header.wire = slice;
                }
                blob
            }
        };

        let mut targets: Vec<(usize, &'static HeaderDef)> =
            headers.iter().enumerate().map(|(position, h)| (position, h.def)).collect();
        targets.sort_by(|a, b| order::compare(a.1, b.1));
        let matcher = NameMatcher::synthesize(
            &targets.iter().map(|&(position, def)| (position, def.name)).collect::<Vec<_>>(),
        );

        let hpack = match direction {
            Direction::Request => Some(HpackDispatch::build(&matcher)),
            _ => None,
        };

        let mut positions = vec![None; KnownHeader::count()];
        for (position, header) in headers.iter().enumerate() {
            let slot = &mut positions[header.def.known as usize];
            assert!(
                slot.is_none(),
                "identifier {} appears twice in {direction:?}",
                header.def.known.identifier()
            );
            *slot = Some(position as u16);

            assert_eq!(
                ident::identifier_for(header.def.name),
                header.def.known.identifier(),
                "registry identifier for {:?} does not follow the mapping rule",
                header.def.name
            );
        }

        Self {
            direction,
            headers,
            positions,
            matcher,
            wire_blob,
            invalid_h2h3_bits,
            pseudo_bits,
            hpack,
            content_length_position,
            slot_count,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// All placed headers; positions `0..slot_count()` carry the equal bit
    /// index, Content-Length (if any) comes last.
    pub fn headers(&self) -> &[PlannedHeader] {
        &self.headers
    }

    pub fn header_at(&self, position: usize) -> &PlannedHeader {
        &self.headers[position]
    }

    /// Number of bit-indexed value slots.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Case-insensitive known-name lookup; returns the plan position.
    pub fn find(&self, name: &[u8]) -> Option<usize> {
        self.matcher.find(name)
    }

    pub fn position_of(&self, known: KnownHeader) -> Option<usize> {
        self.positions[known as usize].map(usize::from)
    }

    pub fn matcher(&self) -> &NameMatcher {
        &self.matcher
    }

    pub fn wire_blob(&self) -> &Bytes {
        &self.wire_blob
    }

    /// The `"\r\nName: "` bytes for a planned header.
    pub fn wire_bytes(&self, header: &PlannedHeader) -> Option<&[u8]> {
        header.wire.map(|s| &self.wire_blob[s.offset..s.offset + s.len])
    }

    pub fn invalid_h2h3_bits(&self) -> u64 {
        self.invalid_h2h3_bits
    }

    pub fn pseudo_bits(&self) -> u64 {
        self.pseudo_bits
    }

    pub fn hpack(&self) -> Option<&HpackDispatch> {
        self.hpack.as_ref()
    }

    pub fn content_length_position(&self) -> Option<usize> {
        self.content_length_position
    }
}

static REQUEST: LazyLock<DirectionPlan> = LazyLock::new(|| DirectionPlan::build(Direction::Request));
static RESPONSE: LazyLock<DirectionPlan> =
    LazyLock::new(|| DirectionPlan::build(Direction::Response));
static TRAILERS: LazyLock<DirectionPlan> =
    LazyLock::new(|| DirectionPlan::build(Direction::Trailers));

pub fn request_plan() -> &'static DirectionPlan {
    &REQUEST
}

pub fn response_plan() -> &'static DirectionPlan {
    &RESPONSE
}

pub fn trailers_plan() -> &'static DirectionPlan {
    &TRAILERS
}

pub fn plan_for(direction: Direction) -> &'static DirectionPlan {
    match direction {
        Direction::Request => request_plan(),
        Direction::Response => response_plan(),
        Direction::Trailers => trailers_plan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_content_length_has_no_bit() {
        let plan = request_plan();
        let position = plan.content_length_position().unwrap();
        assert_eq!(plan.header_at(position).index, None);
    }

    #[test]
    fn response_content_length_is_pinned_at_63() {
        let plan = response_plan();
        let position = plan.content_length_position().unwrap();
        assert_eq!(plan.header_at(position).index, Some(63));
        assert_eq!(position, plan.slot_count());
    }

    #[test]
    fn matcher_resolves_every_member_to_its_position() {
        for plan in [request_plan(), response_plan(), trailers_plan()] {
            for (position, header) in plan.headers().iter().enumerate() {
                assert_eq!(
                    plan.find(header.name().as_bytes()),
                    Some(position),
                    "{:?} in {:?}",
                    header.name(),
                    plan.direction()
                );
            }
        }
    }

    #[test]
    fn serialized_directions_carry_wire_slices() {
        for plan in [response_plan(), trailers_plan()] {
            for header in plan.headers() {
                if header.def.is_pseudo() {
                    assert!(header.wire.is_none());
                } else {
                    let bytes = plan.wire_bytes(header).unwrap();
                    let expected = format!("\r\n{}: ", header.name());
                    assert_eq!(bytes, expected.as_bytes());
                }
            }
        }
        assert!(request_plan().wire_blob().is_empty());
    }

    #[test]
    fn only_the_request_plan_dispatches_hpack() {
        assert!(request_plan().hpack().is_some());
        assert!(response_plan().hpack().is_none());
        assert!(trailers_plan().hpack().is_none());
    }
}
