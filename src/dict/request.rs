//! Request-direction operations: the HTTP/1 and HTTP/2 parser entry points
//! and the cross-message value reuse rule.

use tracing::trace;

use crate::error::HeaderError;
use crate::registry::KnownHeader;

use super::{parse_content_length, Headers, HeaderValues, Request, ValueEncoding};

impl Headers<Request> {
    /// HTTP/1 parse path. Matches the raw name against the known set; a hit
    /// stores the value under the header's slot (applying the reuse rule),
    /// a miss stores it in the side map. The parser picks the encoding.
    ///
    /// Content-Length is parsed into its integer slot instead and may only
    /// appear once per message.
    pub fn try_append(
        &mut self,
        name: &[u8],
        value: &[u8],
        encoding: ValueEncoding,
    ) -> Result<(), HeaderError> {
        self.ensure_writable()?;
        match self.plan.find(name) {
            Some(position) => self.append_known(position, value, encoding),
            None => {
                trace!(name = %String::from_utf8_lossy(name), "append of unregistered header");
                let decoded = encoding.decode(value)?;
                // the parser has already constrained the name to ASCII token bytes
                let name = String::from_utf8_lossy(name).into_owned();
                self.append_unknown(&name, decoded);
                Ok(())
            }
        }
    }

    /// HTTP/2 parse path: dispatches an HPACK static-table index straight to
    /// the known header's slot. Returns `Ok(false)` when the index names no
    /// registered request header and the caller must fall back to the
    /// literal-name path.
    pub fn try_hpack_append(
        &mut self,
        index: usize,
        value: &[u8],
        encoding: ValueEncoding,
    ) -> Result<bool, HeaderError> {
        self.ensure_writable()?;
        let dispatch = self.plan.hpack().expect("request plans always carry hpack dispatch");
        match dispatch.lookup(index) {
            Some(position) => {
                self.append_known(position, value, encoding)?;
                Ok(true)
            }
            None => {
                trace!(index, "hpack index outside the known-header fast path");
                Ok(false)
            }
        }
    }

    fn append_known(
        &mut self,
        position: usize,
        value: &[u8],
        encoding: ValueEncoding,
    ) -> Result<(), HeaderError> {
        let header = *self.plan.header_at(position);
        if header.known() == KnownHeader::ContentLength {
            if self.content_length.is_some() {
                return Err(HeaderError::invalid_content_length("value supplied twice"));
            }
            self.content_length = Some(parse_content_length(value)?);
            return Ok(());
        }

        let index = super::known_index(&header);
        let bit = 1u64 << index;

        // Reuse rule: when the previous message on this connection held
        // exactly one value for this header, an identical incoming value
        // keeps the previous allocation.
        if self.previous_bits & bit != 0 {
            self.previous_bits &= !bit;
            let slot = &self.slots[index];
            if slot.values.len() == 1 && slot.values[0].as_ref() == value {
                self.bits |= bit;
                return Ok(());
            }
        }

        let decoded = encoding.decode(value)?;
        let slot = &mut self.slots[index];
        if self.bits & bit == 0 {
            slot.values.clear();
            slot.values.push(decoded);
            self.bits |= bit;
        } else {
            slot.values.push(decoded);
        }
        Ok(())
    }

    /// Ends the current message and prepares the instance for the next one
    /// on the same connection. Presence moves into the reuse snapshot and
    /// the value slots stay populated, so a repeated identical header value
    /// is stored without a fresh allocation.
    pub fn reset_for_reuse(&mut self) {
        self.previous_bits = self.bits;
        self.bits = 0;
        self.content_length = None;
        self.unknown.clear();
        self.read_only = false;
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub fn has_connection(&self) -> bool {
        self.contains_known(KnownHeader::Connection)
    }

    pub fn has_transfer_encoding(&self) -> bool {
        self.contains_known(KnownHeader::TransferEncoding)
    }

    /// Number of Host values currently present.
    pub fn host_count(&self) -> usize {
        match self.plan.position_of(KnownHeader::Host) {
            Some(position) if self.has_at(position) => {
                let header = self.plan.header_at(position);
                self.slots[super::known_index(header)].values.len()
            }
            _ => 0,
        }
    }

    pub fn host(&self) -> Option<HeaderValues> {
        self.get_known(KnownHeader::Host)
    }

    pub fn user_agent(&self) -> Option<HeaderValues> {
        self.get_known(KnownHeader::UserAgent)
    }

    pub fn accept(&self) -> Option<HeaderValues> {
        self.get_known(KnownHeader::Accept)
    }

    // HTTP/2 pseudo headers, kept off the public enumeration but reachable
    // for protocol handling.

    pub fn authority(&self) -> Option<HeaderValues> {
        self.get_known(KnownHeader::Authority)
    }

    pub fn method(&self) -> Option<HeaderValues> {
        self.get_known(KnownHeader::Method)
    }

    pub fn path(&self) -> Option<HeaderValues> {
        self.get_known(KnownHeader::Path)
    }

    pub fn scheme(&self) -> Option<HeaderValues> {
        self.get_known(KnownHeader::Scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append(headers: &mut Headers<Request>, name: &str, value: &str) {
        headers.try_append(name.as_bytes(), value.as_bytes(), ValueEncoding::Ascii).unwrap();
    }

    #[test]
    fn known_appends_set_the_bit_once_and_keep_value_order() {
        let mut headers = Headers::<Request>::new();
        append(&mut headers, "Accept-Encoding", "gzip");
        append(&mut headers, "accept-encoding", "br");
        assert_eq!(headers.get("Accept-Encoding").unwrap(), ["gzip", "br"]);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn content_length_appends_parse_and_reject_duplicates() {
        let mut headers = Headers::<Request>::new();
        append(&mut headers, "Content-Length", "1024");
        assert_eq!(headers.content_length(), Some(1024));
        assert_eq!(headers.len(), 1);

        let err = headers
            .try_append(b"content-length", b"1024", ValueEncoding::Ascii)
            .unwrap_err();
        assert!(matches!(err, HeaderError::InvalidContentLength { .. }));
    }

    #[test]
    fn reuse_keeps_the_previous_allocation() {
        let mut headers = Headers::<Request>::new();
        append(&mut headers, "User-Agent", "curl/8.5.0");
        let first = headers.user_agent().unwrap().first().unwrap().clone();

        headers.reset_for_reuse();
        assert!(headers.user_agent().is_none());

        append(&mut headers, "User-Agent", "curl/8.5.0");
        let second = headers.user_agent().unwrap().first().unwrap().clone();
        assert_eq!(first.as_ptr(), second.as_ptr());
    }

    #[test]
    fn reuse_requires_an_identical_single_value() {
        let mut headers = Headers::<Request>::new();
        append(&mut headers, "User-Agent", "curl/8.5.0");
        let first = headers.user_agent().unwrap().first().unwrap().clone();

        headers.reset_for_reuse();
        append(&mut headers, "User-Agent", "curl/8.6.0");
        let second = headers.user_agent().unwrap().first().unwrap().clone();
        assert_ne!(first.as_ptr(), second.as_ptr());
        assert_eq!(headers.user_agent().unwrap(), "curl/8.6.0");
    }

    #[test]
    fn multi_valued_headers_do_not_reuse() {
        let mut headers = Headers::<Request>::new();
        append(&mut headers, "Accept-Encoding", "gzip");
        append(&mut headers, "Accept-Encoding", "br");
        headers.reset_for_reuse();

        append(&mut headers, "Accept-Encoding", "gzip");
        assert_eq!(headers.get("Accept-Encoding").unwrap(), ["gzip"]);
    }

    #[test]
    fn hpack_append_hits_known_request_headers() {
        let mut headers = Headers::<Request>::new();
        // 38 = host, 58 = user-agent
        assert!(headers.try_hpack_append(38, b"example.com", ValueEncoding::Ascii).unwrap());
        assert!(headers.try_hpack_append(58, b"curl/8.5.0", ValueEncoding::Ascii).unwrap());
        assert_eq!(headers.host().unwrap(), "example.com");
        assert_eq!(headers.user_agent().unwrap(), "curl/8.5.0");
    }

    #[test]
    fn hpack_append_misses_unregistered_indices() {
        let mut headers = Headers::<Request>::new();
        // 54 = server (response-only), 56 = strict-transport-security
        assert!(!headers.try_hpack_append(54, b"x", ValueEncoding::Ascii).unwrap());
        assert!(!headers.try_hpack_append(56, b"x", ValueEncoding::Ascii).unwrap());
        assert!(!headers.try_hpack_append(0, b"x", ValueEncoding::Ascii).unwrap());
        assert!(!headers.try_hpack_append(99, b"x", ValueEncoding::Ascii).unwrap());
        assert!(headers.is_empty());
    }

    #[test]
    fn existence_and_fast_count_accessors() {
        let mut headers = Headers::<Request>::new();
        assert!(!headers.has_connection());
        assert_eq!(headers.host_count(), 0);

        append(&mut headers, "Connection", "keep-alive");
        append(&mut headers, "Host", "a");
        append(&mut headers, "Host", "b");
        assert!(headers.has_connection());
        assert!(!headers.has_transfer_encoding());
        assert_eq!(headers.host_count(), 2);
    }

    #[test]
    fn frozen_request_headers_refuse_appends() {
        let mut headers = Headers::<Request>::new();
        headers.freeze();
        assert!(matches!(
            headers.try_append(b"Host", b"a", ValueEncoding::Ascii),
            Err(HeaderError::ReadOnly)
        ));
        assert!(matches!(
            headers.try_hpack_append(38, b"a", ValueEncoding::Ascii),
            Err(HeaderError::ReadOnly)
        ));
        headers.reset_for_reuse();
        assert!(!headers.is_read_only());
    }
}
