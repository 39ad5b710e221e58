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

//! Chunky reads the chunk layer of Riegeli/records files.
//!
//! Riegeli/records is a file format for sequences of length-delimited
//! records with compression, random access, and resilience to corruption.
//! This crate implements the layer below records: it reads a records byte
//! stream and yields *chunks*, the internal framing unit that groups
//! records, while enforcing the block/chunk framing rules, verifying
//! structural integrity, seeking to chunk boundaries, and recovering from
//! corruption by re-synchronising on 64 KiB block boundaries.
//!
//! Decoding records out of chunk payloads (and compressing them back)
//! belongs to the layer above and is out of scope here.

pub mod blocks;
pub mod byte_reader;
pub mod chunks;
pub mod constants;
pub mod error;
pub mod hash;
pub mod reader;


// Re-exports for a cleaner API
pub use byte_reader::{ByteReader, PositionedReader, StreamReader};
pub use chunks::{Chunk, ChunkHeader};
pub use error::{ChunkyError, Result};
pub use reader::{ChunkPiece, ChunkReader, SkippedRegion};
