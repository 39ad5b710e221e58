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

//! Parser for chunk headers.

use bytes::{Buf, Bytes};

use crate::chunks::header::{ChunkHeader, CHUNK_HEADER_SIZE};
use crate::error::{ChunkyError, Result};
use crate::hash::highway_hash;

/// Parses a chunk header from `bytes`, advancing past it.
///
/// Verifies the stored hash over the 32 bytes following it. `chunk_begin` is
/// the position the header was read at; it only labels the error on a hash
/// mismatch.
pub fn parse_chunk_header(bytes: &mut Bytes, chunk_begin: u64) -> Result<ChunkHeader> {
    if bytes.remaining() < CHUNK_HEADER_SIZE {
        return Err(ChunkyError::UnexpectedEof);
    }

    let hashed_part = bytes.slice(8..CHUNK_HEADER_SIZE);
    let header_hash = bytes.get_u64_le();
    if highway_hash(&hashed_part) != header_hash {
        return Err(ChunkyError::ChunkHeaderHashMismatch { chunk_begin });
    }

    let data_size = bytes.get_u64_le();
    let data_hash = bytes.get_u64_le();
    let num_records = bytes.get_u64_le();
    let decoded_data_size = bytes.get_u64_le();

    Ok(ChunkHeader {
        data_size,
        data_hash,
        num_records,
        decoded_data_size,
    })
}
