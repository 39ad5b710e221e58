//! Utilities for building correctly framed records streams in tests.

use std::io::Cursor;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::blocks::framing::{self, BLOCK_HEADER_SIZE};
use crate::blocks::header::{write_block_header, BlockHeader};
use crate::byte_reader::PositionedReader;
use crate::chunks::header::{ChunkHeader, CHUNK_HEADER_SIZE};
use crate::chunks::header_writer::write_chunk_header;
use crate::hash::highway_hash;
use crate::reader::ChunkReader;

/// Installs env_logger once so failing tests can be rerun with RUST_LOG set.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Builds a records stream in memory, stamping block headers exactly where
/// the format requires them. This stands in for the format writer: files it
/// produces are byte-valid, and it remembers where each chunk begins so
/// tests can assert against real boundaries.
pub struct FileBuilder {
    buf: Vec<u8>,
    boundaries: Vec<u64>,
}

impl FileBuilder {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            boundaries: Vec::new(),
        }
    }

    /// Appends a chunk whose record count equals its payload length.
    /// Returns the chunk's boundary position.
    pub fn append_chunk(&mut self, payload: &[u8]) -> u64 {
        self.append_chunk_with_records(payload, payload.len() as u64)
    }

    /// Appends a chunk with an explicit record count.
    pub fn append_chunk_with_records(&mut self, payload: &[u8], num_records: u64) -> u64 {
        let header = ChunkHeader {
            data_size: payload.len() as u64,
            data_hash: highway_hash(payload),
            num_records,
            decoded_data_size: payload.len() as u64,
        };
        let chunk_begin = self.buf.len() as u64;
        assert!(framing::is_possible_chunk_boundary(chunk_begin));
        let end = framing::chunk_physical_end(chunk_begin, header.logical_size());

        let mut logical = Vec::with_capacity(CHUNK_HEADER_SIZE + payload.len());
        logical.extend_from_slice(&write_chunk_header(&header));
        logical.extend_from_slice(payload);

        let mut cursor = 0;
        while cursor < logical.len() {
            let pos = self.buf.len() as u64;
            if framing::is_block_boundary(pos) {
                let block_header = BlockHeader {
                    previous_chunk: pos - chunk_begin,
                    next_chunk: end - pos,
                };
                self.buf.extend_from_slice(&write_block_header(&block_header));
                continue;
            }
            let take = (logical.len() - cursor).min(framing::remaining_in_block(pos) as usize);
            self.buf.extend_from_slice(&logical[cursor..cursor + take]);
            cursor += take;
        }
        assert_eq!(self.buf.len() as u64, end);
        self.boundaries.push(chunk_begin);
        chunk_begin
    }

    /// Boundary positions of the appended chunks, in order.
    pub fn boundaries(&self) -> &[u64] {
        &self.boundaries
    }

    /// Position past the last appended chunk.
    pub fn end_pos(&self) -> u64 {
        self.buf.len() as u64
    }

    pub fn build(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

/// Overwrites the block header at `block_begin` with a hash-valid header
/// carrying the given distances. For forging cross-field disagreements.
pub fn forge_block_header(data: &mut [u8], block_begin: u64, header: &BlockHeader) {
    let begin = block_begin as usize;
    data[begin..begin + BLOCK_HEADER_SIZE as usize].copy_from_slice(&write_block_header(header));
}

/// A chunk reader over an in-memory stream.
pub fn reader_over(data: Vec<u8>) -> ChunkReader<PositionedReader<Cursor<Vec<u8>>>> {
    ChunkReader::new(PositionedReader::new(Cursor::new(data)).unwrap())
}

/// Deterministic pseudo-random payload.
pub fn payload(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = vec![0u8; len];
    rng.fill_bytes(&mut out);
    out
}
