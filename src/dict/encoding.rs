//! Header value encodings.
//!
//! The parse path decodes raw value bytes under a pre-selected encoding; the
//! response set path additionally sanitizes characters, since values written
//! there end up on the wire verbatim. Decoding only checks that the bytes fit
//! the encoding (the HTTP/1 parser has already excluded CTL bytes);
//! validation also rejects control bytes and, per encoding, bytes above
//! 0x7F.

use bytes::Bytes;

use crate::error::HeaderError;

/// Encoding applied to header value bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueEncoding {
    /// Visible ASCII plus horizontal tab.
    #[default]
    Ascii,
    /// ASCII plus the printable Latin-1 range 0xA0..=0xFF.
    Latin1,
    /// Any valid UTF-8 without control bytes.
    Utf8,
}

// field-value = *( HTAB / SP / VCHAR ); obs-text is handled per encoding
#[rustfmt::skip]
static LEGAL_ASCII_VALUE: [bool; 128] = {
    const __: bool = false;
    const TT: bool = true;
    [
//      \0                                  HT  LF          CR
        __, __, __, __, __, __, __, __, __, TT, __, __, __, __, __, __,
        __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __,
//      SP  !   "   #   $   %   &   '   (   )   *   +   ,   -   .   /
        TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT,
        TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT,
        TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT,
        TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT,
        TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT,
//      p   q   r   s   t   u   v   w   x   y   z   {   |   }   ~   DEL
        TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, TT, __,
    ]
};

#[inline]
fn legal_ascii(byte: u8) -> bool {
    byte < 0x80 && LEGAL_ASCII_VALUE[byte as usize]
}

impl ValueEncoding {
    /// Response-path sanitization. Returns the first offending byte.
    pub fn validate(self, value: &[u8]) -> Result<(), HeaderError> {
        match self {
            ValueEncoding::Ascii => {
                for (offset, &byte) in value.iter().enumerate() {
                    if !legal_ascii(byte) {
                        return Err(HeaderError::invalid_value(byte, offset));
                    }
                }
            }
            ValueEncoding::Latin1 => {
                for (offset, &byte) in value.iter().enumerate() {
                    if !legal_ascii(byte) && byte < 0xA0 {
                        return Err(HeaderError::invalid_value(byte, offset));
                    }
                }
            }
            ValueEncoding::Utf8 => {
                for (offset, &byte) in value.iter().enumerate() {
                    if byte < 0x80 && !LEGAL_ASCII_VALUE[byte as usize] {
                        return Err(HeaderError::invalid_value(byte, offset));
                    }
                }
                if let Err(e) = std::str::from_utf8(value) {
                    let offset = e.valid_up_to();
                    return Err(HeaderError::invalid_value(value[offset], offset));
                }
            }
        }
        Ok(())
    }

    /// Parse-path decode: checks the bytes fit the encoding and copies them
    /// into an owned buffer.
    pub(crate) fn decode(self, value: &[u8]) -> Result<Bytes, HeaderError> {
        match self {
            ValueEncoding::Ascii => {
                if let Some(offset) = value.iter().position(|&b| b >= 0x80) {
                    return Err(HeaderError::invalid_value(value[offset], offset));
                }
            }
            ValueEncoding::Latin1 => {}
            ValueEncoding::Utf8 => {
                if let Err(e) = std::str::from_utf8(value) {
                    let offset = e.valid_up_to();
                    return Err(HeaderError::invalid_value(value[offset], offset));
                }
            }
        }
        Ok(Bytes::copy_from_slice(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_bytes_fail_validation_under_every_encoding() {
        for encoding in [ValueEncoding::Ascii, ValueEncoding::Latin1, ValueEncoding::Utf8] {
            assert!(encoding.validate(b"ok value").is_ok());
            assert!(encoding.validate(b"tab\tis fine").is_ok());
            assert!(encoding.validate(b"nul\x00").is_err());
            assert!(encoding.validate(b"\x01").is_err());
            assert!(encoding.validate(b"del\x7f").is_err());
            assert!(encoding.validate(b"bare\rcr").is_err());
        }
    }

    #[test]
    fn high_bytes_depend_on_the_encoding() {
        assert!(ValueEncoding::Ascii.validate(b"caf\xe9").is_err());
        assert!(ValueEncoding::Latin1.validate(b"caf\xe9").is_ok());
        assert!(ValueEncoding::Latin1.validate(b"\x85").is_err(), "C1 range stays illegal");
        assert!(ValueEncoding::Utf8.validate("café".as_bytes()).is_ok());
        assert!(ValueEncoding::Utf8.validate(b"caf\xe9").is_err(), "bare latin-1 is not utf-8");
    }

    #[test]
    fn decode_is_laxer_than_validate() {
        // the parser already filtered CTLs; decode only checks the encoding
        assert!(ValueEncoding::Latin1.decode(b"caf\xe9").is_ok());
        assert!(ValueEncoding::Ascii.decode(b"caf\xe9").is_err());
        assert_eq!(ValueEncoding::Ascii.decode(b"gzip").unwrap().as_ref(), b"gzip");
    }
}
