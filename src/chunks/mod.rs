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

//! Chunk-level layer of the Riegeli/records format.
//!
//! A chunk is the framing unit that groups records: a fixed 40-byte header
//! followed by `data_size` payload bytes. Chunks span block boundaries
//! transparently; the interleaved block headers belong to the block layer
//! and never count toward `data_size`.

pub mod chunk;
pub mod header;
pub mod header_parser;
pub mod header_writer;

pub use chunk::Chunk;
pub use header::{ChunkHeader, CHUNK_HEADER_SIZE};
pub use header_parser::parse_chunk_header;
pub use header_writer::write_chunk_header;
