//! HPACK static table and the indexed fast path into the known-header set.
//!
//! RFC 7541 Appendix A defines 61 fixed entries addressed by small integers.
//! Several indices share one name (`:method` is 2 and 3, `:status` spans
//! 8..=14); the dispatcher groups the table by name, resolves each group
//! against the request direction's name matcher once at build time, and the
//! per-index table then routes an incoming index straight to the known
//! header's slot without touching the name bytes.

use super::matcher::NameMatcher;

/// One RFC 7541 static table entry.
#[derive(Debug, Clone, Copy)]
pub struct StaticEntry {
    pub index: u8,
    pub name: &'static str,
    pub value: &'static str,
}

macro_rules! static_table {
    ( $( ($index:expr, $name:expr, $value:expr); )+ ) => {
        /// The HPACK static table, indices 1 through 61.
        pub static STATIC_TABLE: &[StaticEntry] = &[
            $( StaticEntry { index: $index, name: $name, value: $value }, )+
        ];
    };
}

static_table! {
    (1, ":authority", "");
    (2, ":method", "GET");
    (3, ":method", "POST");
    (4, ":path", "/");
    (5, ":path", "/index.html");
    (6, ":scheme", "http");
    (7, ":scheme", "https");
    (8, ":status", "200");
    (9, ":status", "204");
    (10, ":status", "206");
    (11, ":status", "304");
    (12, ":status", "400");
    (13, ":status", "404");
    (14, ":status", "500");
    (15, "accept-charset", "");
    (16, "accept-encoding", "gzip, deflate");
    (17, "accept-language", "");
    (18, "accept-ranges", "");
    (19, "accept", "");
    (20, "access-control-allow-origin", "");
    (21, "age", "");
    (22, "allow", "");
    (23, "authorization", "");
    (24, "cache-control", "");
    (25, "content-disposition", "");
    (26, "content-encoding", "");
    (27, "content-language", "");
    (28, "content-length", "");
    (29, "content-location", "");
    (30, "content-range", "");
    (31, "content-type", "");
    (32, "cookie", "");
    (33, "date", "");
    (34, "etag", "");
    (35, "expect", "");
    (36, "expires", "");
    (37, "from", "");
    (38, "host", "");
    (39, "if-match", "");
    (40, "if-modified-since", "");
    (41, "if-none-match", "");
    (42, "if-range", "");
    (43, "if-unmodified-since", "");
    (44, "last-modified", "");
    (45, "link", "");
    (46, "location", "");
    (47, "max-forwards", "");
    (48, "proxy-authenticate", "");
    (49, "proxy-authorization", "");
    (50, "range", "");
    (51, "referer", "");
    (52, "refresh", "");
    (53, "retry-after", "");
    (54, "server", "");
    (55, "set-cookie", "");
    (56, "strict-transport-security", "");
    (57, "transfer-encoding", "");
    (58, "user-agent", "");
    (59, "vary", "");
    (60, "via", "");
    (61, "www-authenticate", "");
}

/// A wire name, the static-table indices that carry it, and the known header
/// it resolves to (absent when the name is not registered for the direction).
#[derive(Debug, Clone)]
pub struct HpackGroup {
    pub name: &'static str,
    pub indices: Vec<u8>,
    /// Plan position of the matching known header.
    pub header: Option<usize>,
}

/// Routes HPACK static indices to known-header plan positions.
#[derive(Debug, Clone)]
pub struct HpackDispatch {
    /// Indexed by static-table index; slot 0 is unused.
    by_index: Vec<Option<u16>>,
    groups: Vec<HpackGroup>,
}

impl HpackDispatch {
    /// Groups the static table by name and resolves each group through the
    /// direction's matcher. The matcher is case-insensitive, so the table's
    /// lowercase spellings hit registry entries regardless of their canonical
    /// case.
    pub(crate) fn build(matcher: &NameMatcher) -> Self {
        let mut groups: Vec<HpackGroup> = Vec::new();
        for entry in STATIC_TABLE {
            match groups.iter().position(|g| g.name == entry.name) {
                Some(i) => groups[i].indices.push(entry.index),
                None => groups.push(HpackGroup {
                    name: entry.name,
                    indices: vec![entry.index],
                    header: matcher.find(entry.name.as_bytes()),
                }),
            }
        }

        let mut by_index = vec![None; STATIC_TABLE.len() + 1];
        for group in &groups {
            if let Some(position) = group.header {
                for &index in &group.indices {
                    by_index[index as usize] = Some(position as u16);
                }
            }
        }
        Self { by_index, groups }
    }

    /// Plan position of the known header behind a static index, if any.
    pub fn lookup(&self, index: usize) -> Option<usize> {
        self.by_index.get(index).copied().flatten().map(usize::from)
    }

    pub fn groups(&self) -> &[HpackGroup] {
        &self.groups
    }
}
