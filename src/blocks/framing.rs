//! Framing arithmetic: pure position math for the block/chunk interleave.
//!
//! Chunks occupy a logical byte range, but physically every block boundary
//! strictly inside that range carries a 24-byte block header. The functions
//! here map between positions, block boundaries and the interleave overhead
//! without touching any I/O.

/// Size of a block. Every position that is a multiple of this is a block
/// boundary and is immediately followed by a block header.
pub const BLOCK_SIZE: u64 = 1 << 16;

/// Size of the block header stored after every block boundary.
pub const BLOCK_HEADER_SIZE: u64 = 24;

/// Offset of `pos` within its block.
#[inline]
pub fn block_offset(pos: u64) -> u64 {
    pos % BLOCK_SIZE
}

/// Whether `pos` is a block boundary.
#[inline]
pub fn is_block_boundary(pos: u64) -> bool {
    block_offset(pos) == 0
}

/// Bytes from `pos` to the next block boundary. Returns `BLOCK_SIZE` at a
/// boundary.
#[inline]
pub fn remaining_in_block(pos: u64) -> u64 {
    BLOCK_SIZE - block_offset(pos)
}

/// Bytes of the current block's header at or after `pos`. Zero when `pos` is
/// past the header region of its block.
#[inline]
pub fn remaining_in_block_header(pos: u64) -> u64 {
    BLOCK_HEADER_SIZE.saturating_sub(block_offset(pos))
}

/// The greatest block boundary at or before `pos`.
#[inline]
pub fn block_boundary_before(pos: u64) -> u64 {
    pos - block_offset(pos)
}

/// The least block boundary at or after `pos`.
#[inline]
pub fn block_boundary_after_or_at(pos: u64) -> u64 {
    if is_block_boundary(pos) {
        pos
    } else {
        block_boundary_before(pos) + BLOCK_SIZE
    }
}

/// Whether a chunk can begin at `pos`.
///
/// Positions strictly inside a block header can never be chunk boundaries; a
/// chunk either starts exactly at the boundary (the block header is skipped
/// before its first byte) or at least `BLOCK_HEADER_SIZE` into the block.
#[inline]
pub fn is_possible_chunk_boundary(pos: u64) -> bool {
    let offset = block_offset(pos);
    offset == 0 || offset >= BLOCK_HEADER_SIZE
}

/// Logical bytes a block can carry once its header is accounted for.
#[inline]
pub fn usable_block_size() -> u64 {
    BLOCK_SIZE - BLOCK_HEADER_SIZE
}

/// The physical end of a chunk that begins at `chunk_begin` and has
/// `logical_size` logical bytes (serialized chunk header plus payload).
///
/// Block headers interleaved at boundaries inside the chunk occupy physical
/// space without counting toward `logical_size`. The returned position is
/// the boundary of the next chunk; when the chunk's last logical byte lands
/// exactly on a block boundary, the next chunk begins at that boundary and
/// no header is counted for it.
pub fn chunk_physical_end(chunk_begin: u64, logical_size: u64) -> u64 {
    debug_assert!(is_possible_chunk_boundary(chunk_begin));
    if logical_size == 0 {
        return chunk_begin;
    }
    let offset = block_offset(chunk_begin);
    // Offset of the chunk's first logical byte within its block; a chunk
    // starting at the boundary has its bytes after the block header.
    let first = if offset == 0 { BLOCK_HEADER_SIZE } else { offset };
    let available_in_first = BLOCK_SIZE - first;
    if logical_size <= available_in_first {
        return chunk_begin + (first - offset) + logical_size;
    }
    let remaining = logical_size - available_in_first;
    let full_blocks = (remaining - 1) / usable_block_size();
    let in_last = remaining - full_blocks * usable_block_size();
    // Saturates on pathological sizes instead of overflowing.
    let end = block_boundary_before(chunk_begin) as u128
        + (full_blocks as u128 + 1) * BLOCK_SIZE as u128
        + BLOCK_HEADER_SIZE as u128
        + in_last as u128;
    end.min(u64::MAX as u128) as u64
}
