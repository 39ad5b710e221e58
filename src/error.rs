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

//! Error types for reading Riegeli/records chunk streams.

use std::io;
use thiserror::Error;

/// The error type for all chunk reading operations.
///
/// Structural-corruption variants carry the byte offset at which the fault
/// was detected, so that every failure names both the operation and the
/// position.
#[derive(Debug, Error)]
pub enum ChunkyError {
    /// An I/O error from the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// read-block-header: the stored hash does not match the header fields.
    #[error("read-block-header: hash mismatch at block boundary {block_begin}")]
    BlockHeaderHashMismatch { block_begin: u64 },

    /// read-block-header: the header hash is valid but the distance fields
    /// cannot describe a chunk.
    #[error("read-block-header: invalid block header at {block_begin}: {reason}")]
    InvalidBlockHeader { block_begin: u64, reason: String },

    /// read-block-header: a valid block header places the containing chunk
    /// somewhere other than where the reader is.
    #[error(
        "read-block-header: chunk boundary {chunk_begin} is inconsistent \
         with block header at {block_begin}"
    )]
    ChunkBoundaryInconsistency { chunk_begin: u64, block_begin: u64 },

    /// read-chunk-header: the stored hash does not match the header fields.
    #[error("read-chunk-header: hash mismatch at chunk boundary {chunk_begin}")]
    ChunkHeaderHashMismatch { chunk_begin: u64 },

    /// read-chunk: the payload hash does not match the header's data hash.
    #[error("read-chunk: data hash mismatch for chunk at {chunk_begin}")]
    ChunkDataHashMismatch { chunk_begin: u64 },

    /// read-chunk-header: the reader's position cannot be a chunk boundary
    /// (it falls inside a block header).
    #[error("read-chunk-header: position {pos} is not a possible chunk boundary")]
    InvalidChunkBoundary { pos: u64 },

    /// close: the source ended in the middle of the chunk at `chunk_begin`.
    #[error("close: truncated file, chunk at {chunk_begin} extends past end of source")]
    Truncated { chunk_begin: u64 },

    /// A seek target lies beyond the end of the source.
    #[error("{op}: position {pos} is past the end of the source ({size})")]
    PositionOutOfRange { op: &'static str, pos: u64, size: u64 },

    /// A seek was requested on a byte source without random access.
    #[error("{op}: byte source does not support random access")]
    NotSeekable { op: &'static str },

    /// Not enough bytes to decode a fixed-size structure.
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// The reader refused an operation because an earlier failure has not
    /// been recovered from.
    #[error("reader is in a failed state: {0}")]
    ReaderFailed(String),

    /// The reader has been closed.
    #[error("reader is closed")]
    Closed,
}

/// A specialized Result type for chunk reading operations.
pub type Result<T> = std::result::Result<T, ChunkyError>;
