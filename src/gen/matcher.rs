//! SWAR name matcher synthesis and evaluation.
//!
//! Known header names are partitioned by exact length. Within a bucket, each
//! name is lowered to a sequence of word-sized masked compares: the name's
//! bytes are consumed greedily in chunk widths 8, 4, 2, 1, and for every byte
//! the mask is `0xDF` when the byte is an ASCII letter (folding the case bit)
//! and `0xFF` otherwise. A candidate matches when every chunk of the input,
//! loaded little-endian at the chunk offset and ANDed with the mask, equals
//! the precomputed comparand. Non-letter positions therefore demand byte-exact
//! equality; only ASCII letters fold.
//!
//! Candidates that share their first chunk's mask and comparand are coalesced
//! into one group so the leading compare is evaluated once per group. This
//! collapses name families such as `Content-Encoding`/`Content-Language`/
//! `Content-Location` into a single leading load.

/// One masked word compare at a fixed offset into the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchChunk {
    pub offset: u8,
    /// 8, 4, 2 or 1 bytes.
    pub width: u8,
    /// Little-endian packed per-byte masks (`0xDF` for letters, `0xFF` else).
    pub mask: u64,
    /// Little-endian packed `name[offset..offset + width] & mask`.
    pub comparand: u64,
}

/// A candidate header within a group: the chunks after the shared lead.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Position of the header in the owning direction plan.
    pub header: usize,
    pub rest: Vec<MatchChunk>,
}

/// Candidates sharing the first chunk's mask and comparand.
#[derive(Debug, Clone)]
pub struct MatchGroup {
    pub lead: MatchChunk,
    pub candidates: Vec<Candidate>,
}

/// All headers of one exact name length.
#[derive(Debug, Clone)]
pub struct LengthBucket {
    pub len: usize,
    pub groups: Vec<MatchGroup>,
}

/// The synthesized matcher for one direction.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    /// Sorted by `len` ascending.
    buckets: Vec<LengthBucket>,
}

impl NameMatcher {
    /// Synthesizes the matcher from `(position, name)` pairs. The caller
    /// passes targets already sorted by the ordering policy; group order and
    /// candidate order within a group both preserve it.
    pub(crate) fn synthesize(targets: &[(usize, &'static str)]) -> Self {
        let mut buckets: Vec<LengthBucket> = Vec::new();
        for &(position, name) in targets {
            let bytes = name.as_bytes();
            debug_assert!(!bytes.is_empty() && bytes.len() <= u8::MAX as usize);

            let bucket = match buckets.iter().position(|b| b.len == bytes.len()) {
                Some(i) => i,
                None => {
                    buckets.push(LengthBucket { len: bytes.len(), groups: Vec::new() });
                    buckets.len() - 1
                }
            };
            let groups = &mut buckets[bucket].groups;

            let chunks = chunks_for(bytes);
            let (lead, rest) = chunks.split_first().unwrap();
            let candidate = Candidate { header: position, rest: rest.to_vec() };
            match groups.iter().position(|g| g.lead == *lead) {
                Some(i) => groups[i].candidates.push(candidate),
                None => groups.push(MatchGroup { lead: *lead, candidates: vec![candidate] }),
            }
        }
        buckets.sort_by_key(|b| b.len);
        Self { buckets }
    }

    /// Matches `name` case-insensitively against the known set and returns
    /// the plan position of the matching header.
    pub fn find(&self, name: &[u8]) -> Option<usize> {
        let bucket = match self.buckets.binary_search_by_key(&name.len(), |b| b.len) {
            Ok(i) => &self.buckets[i],
            Err(_) => return None,
        };
        for group in &bucket.groups {
            if !term_matches(name, &group.lead) {
                continue;
            }
            'candidates: for candidate in &group.candidates {
                for chunk in &candidate.rest {
                    if !term_matches(name, chunk) {
                        continue 'candidates;
                    }
                }
                return Some(candidate.header);
            }
        }
        None
    }

    pub(crate) fn buckets(&self) -> &[LengthBucket] {
        &self.buckets
    }
}

#[inline]
fn term_matches(name: &[u8], chunk: &MatchChunk) -> bool {
    (load(name, chunk.offset as usize, chunk.width) & chunk.mask) == chunk.comparand
}

/// Little-endian word load reconstructed from byte loads. The bucket length
/// check guarantees the subslice bounds, so the conversions cannot fail.
#[inline]
fn load(bytes: &[u8], offset: usize, width: u8) -> u64 {
    match width {
        8 => u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap()),
        4 => u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap()) as u64,
        2 => u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap()) as u64,
        _ => bytes[offset] as u64,
    }
}

/// Decomposes a name into masked chunks, widths 8/4/2/1, greedy descending.
pub(crate) fn chunks_for(name: &[u8]) -> Vec<MatchChunk> {
    let mut chunks = Vec::new();
    let mut offset = 0usize;
    for width in [8usize, 4, 2, 1] {
        while name.len() - offset >= width {
            chunks.push(chunk_at(name, offset, width));
            offset += width;
        }
    }
    chunks
}

fn chunk_at(name: &[u8], offset: usize, width: usize) -> MatchChunk {
    let mut mask = 0u64;
    let mut comparand = 0u64;
    for i in 0..width {
        let byte = name[offset + i];
        let m: u64 = if byte.is_ascii_alphabetic() { 0xDF } else { 0xFF };
        mask |= m << (8 * i);
        comparand |= ((byte as u64) & m) << (8 * i);
    }
    MatchChunk { offset: offset as u8, width: width as u8, mask, comparand }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_chunk_widths() {
        let widths =
            |name: &str| chunks_for(name.as_bytes()).iter().map(|c| c.width).collect::<Vec<_>>();
        assert_eq!(widths("TE"), [2]);
        assert_eq!(widths("Via"), [2, 1]);
        assert_eq!(widths("Host"), [4]);
        assert_eq!(widths("Referer"), [4, 2, 1]);
        assert_eq!(widths("Content-Length"), [8, 4, 2]);
        assert_eq!(widths("Access-Control-Request-Headers"), [8, 8, 8, 4, 2]);
    }

    #[test]
    fn letter_bytes_fold_non_letters_do_not() {
        let chunk = chunk_at(b"a-", 0, 2);
        assert_eq!(chunk.mask, 0xFF_DF);
        assert_eq!(chunk.comparand, 0x2D_41);
    }

    #[test]
    fn matches_any_case_of_a_registered_name() {
        let matcher = NameMatcher::synthesize(&[(0, "Host"), (1, "Content-Length")]);
        assert_eq!(matcher.find(b"Host"), Some(0));
        assert_eq!(matcher.find(b"HOST"), Some(0));
        assert_eq!(matcher.find(b"hOsT"), Some(0));
        assert_eq!(matcher.find(b"content-length"), Some(1));
        assert_eq!(matcher.find(b"CONTENT-LENGTH"), Some(1));
    }

    #[test]
    fn non_letter_positions_are_exact() {
        let matcher = NameMatcher::synthesize(&[(0, "Content-Type")]);
        // flipping bit 5 of the hyphen must not fold
        assert_eq!(matcher.find(b"Content\x0dType"), None);
        assert_eq!(matcher.find(b"Content.Type"), None);
        assert_eq!(matcher.find(b"content-type"), Some(0));
    }

    #[test]
    fn unknown_lengths_and_names_miss() {
        let matcher = NameMatcher::synthesize(&[(0, "Host")]);
        assert_eq!(matcher.find(b"Hos"), None);
        assert_eq!(matcher.find(b"Hostt"), None);
        assert_eq!(matcher.find(b"Hast"), None);
    }

    #[test]
    fn name_family_shares_one_lead_group() {
        let matcher = NameMatcher::synthesize(&[
            (0, "Content-Encoding"),
            (1, "Content-Language"),
            (2, "Content-Location"),
        ]);
        let bucket = &matcher.buckets()[0];
        assert_eq!(bucket.len, 16);
        assert_eq!(bucket.groups.len(), 1);
        assert_eq!(bucket.groups[0].candidates.len(), 3);
        assert_eq!(matcher.find(b"content-language"), Some(1));
        assert_eq!(matcher.find(b"CONTENT-LOCATION"), Some(2));
    }
}
