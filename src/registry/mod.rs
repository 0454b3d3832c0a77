//! Build-time registry of known HTTP headers.
//!
//! The [`known_headers!`] table below is the single source of truth the rest
//! of the crate is derived from: bit layouts, the SWAR name matcher, the
//! pre-encoded wire blobs and the HPACK dispatch tables are all computed from
//! these rows. Headers are declared in four sections; `common` rows belong to
//! both the request and the response direction, the other sections to exactly
//! one. Per-row extra flags opt a header into the policy sets (primary,
//! existence check, fast count, enhanced setter, invalid under HTTP/2 and /3,
//! pseudo header).

pub mod ident;
pub mod order;

/// Category flag bits carried by every [`HeaderDef`].
pub mod flags {
    /// Member of the request direction.
    pub const REQUEST: u16 = 1 << 0;
    /// Member of the response direction.
    pub const RESPONSE: u16 = 1 << 1;
    /// Member of the response-trailers direction.
    pub const TRAILER: u16 = 1 << 2;
    /// Sorts first within its direction; matched earliest in its bucket.
    pub const PRIMARY: u16 = 1 << 3;
    /// Exposes a dedicated "is this header present" predicate.
    pub const EXISTENCE_CHECK: u16 = 1 << 4;
    /// Exposes a cached count of values.
    pub const FAST_COUNT: u16 = 1 << 5;
    /// Supports a raw pre-encoded byte slot that replaces serialization.
    pub const ENHANCED_SETTER: u16 = 1 << 6;
    /// HTTP/2+ pseudo header, excluded from the public dictionary surface.
    pub const PSEUDO: u16 = 1 << 7;
    /// Connection-level header whose presence is illegal under HTTP/2 and /3.
    pub const INVALID_H2H3: u16 = 1 << 8;
}

use flags::*;

/// The direction a header dictionary serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Request,
    Response,
    Trailers,
}

impl Direction {
    pub(crate) const fn flag(self) -> u16 {
        match self {
            Direction::Request => REQUEST,
            Direction::Response => RESPONSE,
            Direction::Trailers => TRAILER,
        }
    }
}

/// One row of the registry.
#[derive(Debug, Clone, Copy)]
pub struct HeaderDef {
    pub known: KnownHeader,
    /// Canonical wire spelling; matched case-insensitively.
    pub name: &'static str,
    pub flags: u16,
}

impl HeaderDef {
    pub fn in_direction(&self, direction: Direction) -> bool {
        self.flags & direction.flag() != 0
    }

    pub fn is_primary(&self) -> bool {
        self.flags & PRIMARY != 0
    }

    pub fn is_pseudo(&self) -> bool {
        self.flags & PSEUDO != 0
    }

    pub fn has_enhanced_setter(&self) -> bool {
        self.flags & ENHANCED_SETTER != 0
    }

    pub fn is_invalid_h2h3(&self) -> bool {
        self.flags & INVALID_H2H3 != 0
    }
}

macro_rules! known_headers {
    (
        common { $( $(#[$cdoc:meta])* ($ckonst:ident, $cname:expr $(, $cextra:expr)?); )+ }
        request { $( $(#[$rdoc:meta])* ($rkonst:ident, $rname:expr $(, $rextra:expr)?); )+ }
        response { $( $(#[$sdoc:meta])* ($skonst:ident, $sname:expr $(, $sextra:expr)?); )+ }
        trailers { $( $(#[$tdoc:meta])* ($tkonst:ident, $tname:expr $(, $textra:expr)?); )+ }
    ) => {
        /// Closed enumeration of the known header set.
        ///
        /// `Unknown` stands for every header that is not in the registry;
        /// such headers live in the side map of a dictionary instead of a
        /// dedicated slot. Variant names are the stable identifiers produced
        /// by [`ident::identifier_for`] from the wire spelling.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum KnownHeader {
            Unknown,
            $( $(#[$cdoc])* $ckonst, )+
            $( $(#[$rdoc])* $rkonst, )+
            $( $(#[$sdoc])* $skonst, )+
            $( $(#[$tdoc])* $tkonst, )+
        }

        impl KnownHeader {
            /// The canonical wire spelling, empty for `Unknown`.
            pub const fn name(self) -> &'static str {
                match self {
                    KnownHeader::Unknown => "",
                    $( KnownHeader::$ckonst => $cname, )+
                    $( KnownHeader::$rkonst => $rname, )+
                    $( KnownHeader::$skonst => $sname, )+
                    $( KnownHeader::$tkonst => $tname, )+
                }
            }

            /// The language-neutral identifier (the variant name).
            pub const fn identifier(self) -> &'static str {
                match self {
                    KnownHeader::Unknown => "Unknown",
                    $( KnownHeader::$ckonst => stringify!($ckonst), )+
                    $( KnownHeader::$rkonst => stringify!($rkonst), )+
                    $( KnownHeader::$skonst => stringify!($skonst), )+
                    $( KnownHeader::$tkonst => stringify!($tkonst), )+
                }
            }
        }

        /// All registry rows, in declaration order. `KnownHeader` discriminants
        /// are offset by one against this slice (`Unknown` is 0).
        pub static REGISTRY: &[HeaderDef] = &[
            $( HeaderDef { known: KnownHeader::$ckonst, name: $cname, flags: REQUEST | RESPONSE $(| $cextra)? }, )+
            $( HeaderDef { known: KnownHeader::$rkonst, name: $rname, flags: REQUEST $(| $rextra)? }, )+
            $( HeaderDef { known: KnownHeader::$skonst, name: $sname, flags: RESPONSE $(| $sextra)? }, )+
            $( HeaderDef { known: KnownHeader::$tkonst, name: $tname, flags: TRAILER $(| $textra)? }, )+
        ];
    };
}

known_headers! {
    common {
        (Allow, "Allow");
        (CacheControl, "Cache-Control");
        /// Hop-by-hop; drives both the existence predicate and the
        /// invalid-under-H2/H3 mask.
        (Connection, "Connection", PRIMARY | EXISTENCE_CHECK | ENHANCED_SETTER | INVALID_H2H3);
        (ContentEncoding, "Content-Encoding");
        (ContentLanguage, "Content-Language");
        /// Stored as a parsed integer, never in a value slot. Carries no bit
        /// in the request direction and is pinned to bit 63 in the response
        /// direction.
        (ContentLength, "Content-Length");
        (ContentLocation, "Content-Location");
        (ContentMD5, "Content-MD5");
        (ContentRange, "Content-Range");
        (ContentType, "Content-Type", PRIMARY | ENHANCED_SETTER);
        (Date, "Date", PRIMARY | ENHANCED_SETTER);
        (Expires, "Expires");
        (KeepAlive, "Keep-Alive", INVALID_H2H3);
        (LastModified, "Last-Modified");
        (Pragma, "Pragma");
        (Trailer, "Trailer");
        (TransferEncoding, "Transfer-Encoding", EXISTENCE_CHECK | ENHANCED_SETTER | INVALID_H2H3);
        (Upgrade, "Upgrade", INVALID_H2H3);
        (Via, "Via");
        (Warning, "Warning");
    }
    request {
        (Accept, "Accept", PRIMARY);
        (AcceptCharset, "Accept-Charset");
        (AcceptEncoding, "Accept-Encoding");
        (AcceptLanguage, "Accept-Language");
        (AccessControlRequestHeaders, "Access-Control-Request-Headers");
        (AccessControlRequestMethod, "Access-Control-Request-Method");
        (Authority, ":authority", PSEUDO);
        (Authorization, "Authorization");
        /// W3C trace-context headers keep their lowercase wire spelling; the
        /// identifier comes from the explicit override list.
        (Baggage, "baggage");
        (CorrelationContext, "Correlation-Context");
        (Cookie, "Cookie");
        (Expect, "Expect");
        (From, "From");
        (Host, "Host", PRIMARY | FAST_COUNT);
        (IfMatch, "If-Match");
        (IfModifiedSince, "If-Modified-Since");
        (IfNoneMatch, "If-None-Match");
        (IfRange, "If-Range");
        (IfUnmodifiedSince, "If-Unmodified-Since");
        (MaxForwards, "Max-Forwards");
        (Method, ":method", PSEUDO);
        (Origin, "Origin");
        (Path, ":path", PSEUDO);
        (ProxyAuthorization, "Proxy-Authorization");
        (Range, "Range");
        (Referer, "Referer");
        (RequestId, "Request-Id");
        (Scheme, ":scheme", PSEUDO);
        (TE, "TE");
        (TraceParent, "traceparent");
        (TraceState, "tracestate");
        (Translate, "Translate");
        (UpgradeInsecureRequests, "Upgrade-Insecure-Requests");
        (UserAgent, "User-Agent", PRIMARY);
    }
    response {
        (AcceptRanges, "Accept-Ranges");
        (AccessControlAllowCredentials, "Access-Control-Allow-Credentials");
        (AccessControlAllowHeaders, "Access-Control-Allow-Headers");
        (AccessControlAllowMethods, "Access-Control-Allow-Methods");
        (AccessControlAllowOrigin, "Access-Control-Allow-Origin");
        (AccessControlExposeHeaders, "Access-Control-Expose-Headers");
        (AccessControlMaxAge, "Access-Control-Max-Age");
        (Age, "Age");
        (AltSvc, "Alt-Svc");
        (ETag, "ETag", TRAILER);
        (Location, "Location");
        (ProxyAuthenticate, "Proxy-Authenticate");
        (ProxyConnection, "Proxy-Connection", INVALID_H2H3);
        (RetryAfter, "Retry-After");
        (Server, "Server", PRIMARY | ENHANCED_SETTER);
        (SetCookie, "Set-Cookie");
        (Status, ":status", PSEUDO);
        (Vary, "Vary");
        (WWWAuthenticate, "WWW-Authenticate");
    }
    trailers {
        (GrpcMessage, "Grpc-Message");
        (GrpcStatus, "Grpc-Status");
    }
}

impl KnownHeader {
    /// Number of enum variants, `Unknown` included.
    pub fn count() -> usize {
        REGISTRY.len() + 1
    }
}
