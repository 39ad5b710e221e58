//! Codec for the 24-byte block header.

use bytes::{Buf, BufMut};

use crate::blocks::framing::{self, BLOCK_HEADER_SIZE};
use crate::error::{ChunkyError, Result};
use crate::hash::highway_hash;

/// A block header: the two chunk distances stamped after every block
/// boundary. The stored hash is verified at parse time and recomputed at
/// serialization time, so a `BlockHeader` value is always consistent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    /// Distance from the block boundary back to the start of the chunk this
    /// block is part of. Zero when a chunk starts exactly at the boundary.
    pub previous_chunk: u64,

    /// Distance from the block boundary forward to the start of the next
    /// chunk.
    pub next_chunk: u64,
}

impl BlockHeader {
    /// Position of the chunk containing the block that starts at
    /// `block_begin`.
    pub fn chunk_begin(&self, block_begin: u64) -> u64 {
        block_begin - self.previous_chunk
    }

    /// Position of the first chunk starting after the chunk containing
    /// `block_begin`.
    pub fn next_chunk_begin(&self, block_begin: u64) -> u64 {
        block_begin + self.next_chunk
    }
}

/// Parses and verifies a block header read at `block_begin`.
///
/// Verifies the stored hash over the two distance fields, then checks that
/// the distances can describe real chunk positions: `previous_chunk` must
/// not reach back past the beginning of the stream, both derived positions
/// must be possible chunk boundaries, and `next_chunk` must make progress.
pub fn parse_block_header(bytes: &[u8; BLOCK_HEADER_SIZE as usize], block_begin: u64) -> Result<BlockHeader> {
    let mut buf = &bytes[..];
    let header_hash = buf.get_u64_le();
    let previous_chunk = buf.get_u64_le();
    let next_chunk = buf.get_u64_le();

    if highway_hash(&bytes[8..24]) != header_hash {
        return Err(ChunkyError::BlockHeaderHashMismatch { block_begin });
    }

    let header = BlockHeader {
        previous_chunk,
        next_chunk,
    };
    validate_block_header(&header, block_begin)?;
    Ok(header)
}

/// Serializes a block header, computing its hash.
pub fn write_block_header(header: &BlockHeader) -> [u8; BLOCK_HEADER_SIZE as usize] {
    let mut body = [0u8; 16];
    {
        let mut buf = &mut body[..];
        buf.put_u64_le(header.previous_chunk);
        buf.put_u64_le(header.next_chunk);
    }
    let mut out = [0u8; BLOCK_HEADER_SIZE as usize];
    {
        let mut buf = &mut out[..];
        buf.put_u64_le(highway_hash(&body));
        buf.put_slice(&body);
    }
    out
}

fn validate_block_header(header: &BlockHeader, block_begin: u64) -> Result<()> {
    let invalid = |reason: String| ChunkyError::InvalidBlockHeader {
        block_begin,
        reason,
    };

    if header.previous_chunk > block_begin {
        return Err(invalid(format!(
            "previous_chunk {} reaches before the start of the stream",
            header.previous_chunk
        )));
    }
    if !framing::is_possible_chunk_boundary(header.chunk_begin(block_begin)) {
        return Err(invalid(format!(
            "previous_chunk {} does not point at a chunk boundary",
            header.previous_chunk
        )));
    }
    if header.next_chunk == 0 {
        return Err(invalid("next_chunk is zero".to_string()));
    }
    match block_begin.checked_add(header.next_chunk) {
        Some(next_begin) if framing::is_possible_chunk_boundary(next_begin) => {}
        _ => {
            return Err(invalid(format!(
                "next_chunk {} does not point at a chunk boundary",
                header.next_chunk
            )));
        }
    }
    Ok(())
}
