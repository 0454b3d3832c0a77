//! Bit layout planning.
//!
//! Headers of a direction are sorted by the ordering policy and assigned bit
//! indices equal to their position. Content-Length is taken out of the
//! ordering first: the request direction stores it without a bit, the
//! response direction pins it at bit 63. Non-pinned indices never exceed 62.

use crate::registry::{order, Direction, HeaderDef, KnownHeader, REGISTRY};

pub(crate) struct Layout {
    /// Bit `i` belongs to `ordered[i]`.
    pub ordered: Vec<&'static HeaderDef>,
    /// Present for request and response directions.
    pub content_length: Option<&'static HeaderDef>,
    /// OR of `1 << index` for connection-level headers illegal under HTTP/2
    /// and /3. Only populated for the response direction.
    pub invalid_h2h3_bits: u64,
    /// OR of `1 << index` for pseudo headers.
    pub pseudo_bits: u64,
}

pub(crate) fn plan(direction: Direction) -> Layout {
    let mut members: Vec<&'static HeaderDef> =
        REGISTRY.iter().filter(|d| d.in_direction(direction)).collect();

    let content_length_position = members.iter().position(|d| d.known == KnownHeader::ContentLength);
    let content_length = content_length_position.map(|i| members.remove(i));

    members.sort_by(|a, b| order::compare(a, b));

    assert!(
        members.len() <= 63,
        "{direction:?} direction overflows the presence word: {} headers",
        members.len()
    );

    let mask_of = |pred: fn(&HeaderDef) -> bool| {
        members
            .iter()
            .enumerate()
            .filter(|(_, d)| pred(d))
            .fold(0u64, |acc, (i, _)| acc | 1 << i)
    };

    let invalid_h2h3_bits = match direction {
        Direction::Response => mask_of(HeaderDef::is_invalid_h2h3),
        _ => 0,
    };
    let pseudo_bits = mask_of(HeaderDef::is_pseudo);

    Layout { ordered: members, content_length, invalid_h2h3_bits, pseudo_bits }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_length_is_pulled_out_of_every_layout() {
        for direction in [Direction::Request, Direction::Response] {
            let layout = plan(direction);
            assert!(layout.content_length.is_some());
            assert!(!layout.ordered.iter().any(|d| d.known == KnownHeader::ContentLength));
        }
        assert!(plan(Direction::Trailers).content_length.is_none());
    }

    #[test]
    fn primary_headers_take_the_low_bits() {
        let layout = plan(Direction::Request);
        let primary_count = layout.ordered.iter().filter(|d| d.is_primary()).count();
        assert!(layout.ordered[..primary_count].iter().all(|d| d.is_primary()));
        assert!(layout.ordered[primary_count..].iter().all(|d| !d.is_primary()));
    }

    #[test]
    fn response_invalid_mask_has_five_bits() {
        let layout = plan(Direction::Response);
        assert_eq!(layout.invalid_h2h3_bits.count_ones(), 5);
    }
}
