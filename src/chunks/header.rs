// Copyright 2026
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The chunk header structure.

use crate::blocks::framing;

/// Serialized size of a chunk header in bytes: five little-endian u64s
/// (`header_hash`, `data_size`, `data_hash`, `num_records`,
/// `decoded_data_size`). The stored hash covers the 32 bytes after it.
pub const CHUNK_HEADER_SIZE: usize = 40;

/// A chunk header.
///
/// `header_hash` is not stored here; it is verified when parsing and
/// recomputed when serializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Size of the chunk payload, excluding interleaved block headers.
    pub data_size: u64,
    /// HighwayHash of the payload (the logical, block-header-stripped bytes).
    pub data_hash: u64,
    /// Number of records in the chunk.
    pub num_records: u64,
    /// Sum of record sizes after decoding, for the record layer above.
    pub decoded_data_size: u64,
}

impl ChunkHeader {
    /// Logical size of the whole chunk: serialized header plus payload.
    pub fn logical_size(&self) -> u64 {
        (CHUNK_HEADER_SIZE as u64).saturating_add(self.data_size)
    }

    /// Physical end of a chunk with this header starting at `chunk_begin`,
    /// accounting for block headers interleaved inside it. This is the
    /// boundary of the following chunk.
    pub fn chunk_end(&self, chunk_begin: u64) -> u64 {
        framing::chunk_physical_end(chunk_begin, self.logical_size())
    }
}
