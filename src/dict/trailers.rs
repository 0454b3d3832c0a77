//! Trailer-direction operations. Trailers share the response storage and
//! serializer but have no Content-Length and no invalid-under-H2/H3 mask.

use bytes::BytesMut;

use super::{Headers, Trailers};

impl Headers<Trailers> {
    /// Writes every present trailer onto the wire.
    pub fn encode(&self, dst: &mut BytesMut) {
        self.encode_fields(dst);
    }
}
