//! Response-direction operations: the pinned Content-Length, raw enhanced
//! setters, the invalid-under-H2/H3 mask and the wire serializer.

use bytes::{Bytes, BytesMut};

use crate::error::HeaderError;
use crate::registry::KnownHeader;

use super::{Headers, Response, Slot};

impl Headers<Response> {
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Sets or clears Content-Length. Presence is mirrored into the pinned
    /// bit 63 so the serializer and enumerator reach it like any other set
    /// bit.
    pub fn set_content_length(&mut self, value: Option<u64>) -> Result<(), HeaderError> {
        self.ensure_writable()?;
        self.set_content_length_inner(value);
        Ok(())
    }

    /// Stores a value together with its pre-encoded wire form. `raw` must
    /// hold the complete `"\r\nName: value"` bytes; the serializer writes it
    /// verbatim instead of formatting the value.
    ///
    /// Panics when `known` is not a response header with an enhanced setter;
    /// raw slots exist only for that policy set.
    pub fn set_raw(
        &mut self,
        known: KnownHeader,
        value: &str,
        raw: impl Into<Bytes>,
    ) -> Result<(), HeaderError> {
        self.ensure_writable()?;
        let position = self.plan.position_of(known).unwrap_or_else(|| {
            panic!("{} is not a response direction header", known.identifier())
        });
        let header = *self.plan.header_at(position);
        assert!(header.def.has_enhanced_setter(), "{} has no raw slot", known.identifier());

        self.encoding.validate(value.as_bytes())?;
        let index = super::known_index(&header);
        let slot = &mut self.slots[index];
        slot.values.clear();
        slot.values.push(Bytes::copy_from_slice(value.as_bytes()));
        slot.raw = Some(raw.into());
        self.bits |= 1 << index;
        Ok(())
    }

    /// Whether any connection-level header illegal under HTTP/2 and /3 is
    /// present (Connection, Keep-Alive, Proxy-Connection, Transfer-Encoding,
    /// Upgrade).
    pub fn has_invalid_h2h3_headers(&self) -> bool {
        self.bits & self.plan.invalid_h2h3_bits() != 0
    }

    /// Drops every header covered by the invalid-under-H2/H3 mask.
    pub fn clear_invalid_h2h3_headers(&mut self) -> Result<(), HeaderError> {
        self.ensure_writable()?;
        let mut remaining = self.bits & self.plan.invalid_h2h3_bits();
        self.bits &= !self.plan.invalid_h2h3_bits();
        while remaining != 0 {
            let index = remaining.trailing_zeros() as usize;
            remaining &= remaining - 1;
            self.slots[index] = Slot::default();
        }
        Ok(())
    }

    pub fn has_connection(&self) -> bool {
        self.contains_known(KnownHeader::Connection)
    }

    pub fn has_transfer_encoding(&self) -> bool {
        self.contains_known(KnownHeader::TransferEncoding)
    }

    /// Writes every present header onto the wire: pre-encoded key slices and
    /// value text, raw bytes for populated enhanced setters, the decimal
    /// integer for Content-Length.
    pub fn encode(&self, dst: &mut BytesMut) {
        self.encode_fields(dst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::ResponseHeaders;
    use crate::error::HeaderError;

    fn encoded(headers: &ResponseHeaders) -> Vec<u8> {
        let mut dst = BytesMut::new();
        headers.encode(&mut dst);
        dst.to_vec()
    }

    #[test]
    fn serializes_key_slices_and_values() {
        let mut headers = ResponseHeaders::new();
        headers.set("Server", "unit").unwrap();
        headers.set("Vary", "Accept").unwrap();
        assert_eq!(encoded(&headers), b"\r\nServer: unit\r\nVary: Accept");
    }

    #[test]
    fn multi_valued_headers_repeat_the_key() {
        let mut headers = ResponseHeaders::new();
        headers.append("Set-Cookie", "a=1").unwrap();
        headers.append("Set-Cookie", "b=2").unwrap();
        assert_eq!(headers.get("set-cookie").unwrap(), ["a=1", "b=2"]);
        assert_eq!(encoded(&headers), b"\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2");
    }

    #[test]
    fn content_length_serializes_as_a_decimal_from_the_pinned_bit() {
        let mut headers = ResponseHeaders::new();
        headers.set_content_length(Some(42)).unwrap();
        assert_eq!(encoded(&headers), b"\r\nContent-Length: 42");

        headers.set_content_length(None).unwrap();
        assert_eq!(encoded(&headers), b"");
    }

    #[test]
    fn raw_slots_replace_formatting_and_normal_sets_drop_them() {
        let mut headers = ResponseHeaders::new();
        headers
            .set_raw(
                KnownHeader::Date,
                "Sat, 02 Aug 2026 00:00:00 GMT",
                &b"\r\nDate: Sat, 02 Aug 2026 00:00:00 GMT"[..],
            )
            .unwrap();
        assert_eq!(encoded(&headers), b"\r\nDate: Sat, 02 Aug 2026 00:00:00 GMT");
        // the value side stays readable
        assert_eq!(headers.get("date").unwrap(), "Sat, 02 Aug 2026 00:00:00 GMT");

        // a plain set clears the raw companion
        headers.set("Date", "x").unwrap();
        assert_eq!(encoded(&headers), b"\r\nDate: x");
    }

    #[test]
    #[should_panic(expected = "no raw slot")]
    fn raw_setter_panics_without_the_policy_flag() {
        let mut headers = ResponseHeaders::new();
        let _ = headers.set_raw(KnownHeader::Age, "1", &b"\r\nAge: 1"[..]);
    }

    #[test]
    fn invalid_h2h3_detection_and_clearing() {
        let mut headers = ResponseHeaders::new();
        assert!(!headers.has_invalid_h2h3_headers());

        headers.set("Connection", "close").unwrap();
        headers.set("Transfer-Encoding", "chunked").unwrap();
        headers.set("Server", "unit").unwrap();
        assert!(headers.has_invalid_h2h3_headers());

        headers.clear_invalid_h2h3_headers().unwrap();
        assert!(!headers.has_invalid_h2h3_headers());
        assert!(headers.get("Connection").is_none());
        assert!(headers.get("Transfer-Encoding").is_none());
        assert_eq!(headers.get("Server").unwrap(), "unit");
        assert_eq!(encoded(&headers), b"\r\nServer: unit");
    }

    #[test]
    fn response_values_are_sanitized() {
        let mut headers = ResponseHeaders::new();
        let err = headers.set("ETag", "bad\u{1}tag").unwrap_err();
        assert!(matches!(err, HeaderError::InvalidValue { byte: 0x01, .. }));
        assert!(!headers.contains("ETag"));
    }
}
