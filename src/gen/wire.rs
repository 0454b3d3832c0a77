//! Pre-encoded wire name bytes.
//!
//! The serializer never formats a known header name at runtime: each
//! serialized direction carries one static blob holding `"\r\nName: "` for
//! every non-pseudo member in bit index order, and each header records its
//! slice. The slices are written verbatim, so the blob must be ASCII and
//! stable across process lifetime.

use bytes::{BufMut, Bytes, BytesMut};

use crate::registry::HeaderDef;

/// Position of one header's `"\r\nName: "` bytes in its direction blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireSlice {
    pub offset: usize,
    pub len: usize,
}

/// Builds the blob for one direction. `headers` is the plan order (bit index
/// ascending, Content-Length last); pseudo headers get no slice.
pub(crate) fn build_blob(headers: &[&'static HeaderDef]) -> (Bytes, Vec<Option<WireSlice>>) {
    let mut blob = BytesMut::new();
    let mut slices = Vec::with_capacity(headers.len());
    for def in headers {
        if def.is_pseudo() {
            slices.push(None);
            continue;
        }
        debug_assert!(def.name.is_ascii());
        let offset = blob.len();
        blob.put_slice(b"\r\n");
        blob.put_slice(def.name.as_bytes());
        blob.put_slice(b": ");
        slices.push(Some(WireSlice { offset, len: blob.len() - offset }));
    }
    (blob.freeze(), slices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{flags, KnownHeader};

    #[test]
    fn slices_cover_disjoint_key_prefixes() {
        let server: &'static HeaderDef = Box::leak(Box::new(HeaderDef {
            known: KnownHeader::Server,
            name: "Server",
            flags: flags::RESPONSE,
        }));
        let age: &'static HeaderDef = Box::leak(Box::new(HeaderDef {
            known: KnownHeader::Age,
            name: "Age",
            flags: flags::RESPONSE,
        }));
        let status: &'static HeaderDef = Box::leak(Box::new(HeaderDef {
            known: KnownHeader::Status,
            name: ":status",
            flags: flags::RESPONSE | flags::PSEUDO,
        }));

        let (blob, slices) = build_blob(&[server, status, age]);
        assert_eq!(&blob[..], b"\r\nServer: \r\nAge: ");

        let server_slice = slices[0].unwrap();
        assert_eq!(&blob[server_slice.offset..server_slice.offset + server_slice.len], b"\r\nServer: ");
        assert_eq!(slices[1], None);
        let age_slice = slices[2].unwrap();
        assert_eq!(&blob[age_slice.offset..age_slice.offset + age_slice.len], b"\r\nAge: ");
        assert_eq!(age_slice.offset, server_slice.offset + server_slice.len);
    }
}
