//! Known-header dictionary engine for an HTTP server.
//!
//! A declarative registry of known HTTP headers is lowered, per direction
//! (request, response, response trailers), into a specialized dictionary:
//! bitflag presence tracking, length-bucketed case-insensitive name matching
//! through word-sized SWAR compares, HPACK static-table fast paths, and
//! pre-encoded wire name bytes for serialization. The `gen` module builds the
//! per-direction plans and can render the whole generated surface as one
//! deterministic text artifact.

pub mod dict;
pub mod error;
pub mod gen;
pub mod registry;

pub use dict::{
    HeaderIter, HeaderValues, Headers, RequestHeaders, ResponseHeaders, ResponseTrailers,
    ValueEncoding,
};
pub use error::HeaderError;
pub use registry::{Direction, KnownHeader};
