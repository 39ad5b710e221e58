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

//! Serializer for chunk headers.

use bytes::{BufMut, Bytes, BytesMut};

use crate::chunks::header::{ChunkHeader, CHUNK_HEADER_SIZE};
use crate::hash::highway_hash;

/// Serializes a chunk header to its 40-byte form, computing the header hash.
pub fn write_chunk_header(header: &ChunkHeader) -> Bytes {
    let mut body = BytesMut::with_capacity(CHUNK_HEADER_SIZE - 8);
    body.put_u64_le(header.data_size);
    body.put_u64_le(header.data_hash);
    body.put_u64_le(header.num_records);
    body.put_u64_le(header.decoded_data_size);

    let mut out = BytesMut::with_capacity(CHUNK_HEADER_SIZE);
    out.put_u64_le(highway_hash(&body));
    out.extend_from_slice(&body);
    out.freeze()
}
