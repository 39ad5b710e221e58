//! A chunk: header plus opaque payload.

use bytes::Bytes;

use crate::chunks::header::ChunkHeader;

/// A chunk read from the stream. The payload is opaque at this layer;
/// decoding records out of it belongs to the layer above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub header: ChunkHeader,
    /// The logical payload, `header.data_size` bytes with interleaved block
    /// headers already stripped.
    pub data: Bytes,
}
