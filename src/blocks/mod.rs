//! Block-level layer of the Riegeli/records format.
//!
//! A records file is divided into fixed 64 KiB blocks. The 24 bytes after
//! every block boundary are a [`header::BlockHeader`]:
//!
//! ```text
//! +---------------+----------------+----------------+
//! |  header_hash  | previous_chunk |   next_chunk   |
//! |    (8 bytes)  |    (8 bytes)   |    (8 bytes)   |
//! +---------------+----------------+----------------+
//! ```
//!
//! - `header_hash`: HighwayHash of the two distance fields
//! - `previous_chunk`: distance back from the boundary to the start of the
//!   chunk this block belongs to (0 when a chunk starts at the boundary)
//! - `next_chunk`: distance forward from the boundary to the start of the
//!   next chunk
//!
//! Block headers are not part of any chunk; the chunk layer skips over them
//! transparently. Because each boundary records where its chunk begins and
//! where the next one starts, a reader can land on any block boundary and
//! re-synchronise, which is what makes corruption recovery possible.

pub mod framing;
pub mod header;

pub use framing::{BLOCK_HEADER_SIZE, BLOCK_SIZE};
pub use header::BlockHeader;
