//! The chunk reader: yields chunks from a Riegeli/records byte stream.
//!
//! # Overview
//!
//! [`ChunkReader`] drives an abstract [`ByteReader`] through the double
//! framing of a records file: variable-sized chunks interleaved with the
//! fixed 64 KiB block grid. It
//!
//! - reads chunk headers and payloads, transparently skipping the block
//!   header stamped after every block boundary;
//! - verifies every stored hash and the cross-redundancy between block
//!   headers and chunk boundaries;
//! - seeks to the chunk containing / before / after an arbitrary position
//!   by following the distances recorded in block headers;
//! - recovers from corruption by re-synchronising on block boundaries,
//!   reporting what was skipped as a [`SkippedRegion`].
//!
//! # Usage
//!
//! ```no_run
//! use std::fs::File;
//! use chunky::byte_reader::PositionedReader;
//! use chunky::reader::{ChunkPiece, ChunkReader};
//! use chunky::error::Result;
//!
//! fn dump_chunk_sizes(path: &str) -> Result<()> {
//!     let source = PositionedReader::new(File::open(path)?)?;
//!     let mut reader = ChunkReader::new(source);
//!     loop {
//!         match reader.read_chunk()? {
//!             ChunkPiece::Chunk(chunk) => println!("{} bytes", chunk.data.len()),
//!             ChunkPiece::EOF => break,
//!         }
//!     }
//!     reader.close()
//! }
//! ```
//!
//! The reader is single-owner and has no internal locking; the byte source
//! belongs to it exclusively for its lifetime. End of source is never an
//! error during reads: `read_chunk` returns [`ChunkPiece::EOF`] with the
//! reader still healthy, and a source that ended mid-chunk only surfaces as
//! an error from [`ChunkReader::close`].

use std::fmt;

use bytes::{Bytes, BytesMut};
use log::{debug, info, warn};

use crate::blocks::framing::{self, BLOCK_HEADER_SIZE, BLOCK_SIZE};
use crate::blocks::header::{parse_block_header, BlockHeader};
use crate::byte_reader::ByteReader;
use crate::chunks::chunk::Chunk;
use crate::chunks::header::{ChunkHeader, CHUNK_HEADER_SIZE};
use crate::chunks::header_parser::parse_chunk_header;
use crate::error::{ChunkyError, Result};
use crate::hash::highway_hash;

/// Result of [`ChunkReader::read_chunk`]: a chunk, or the end of the source.
#[derive(Debug)]
pub enum ChunkPiece {
    /// A complete, verified chunk.
    Chunk(Chunk),
    /// No more chunks; the reader stays healthy.
    EOF,
}

/// A byte range `[begin, end)` that the reader skipped because it could not
/// be interpreted. Emitted exclusively by [`ChunkReader::recover`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRegion {
    begin: u64,
    end: u64,
}

impl SkippedRegion {
    pub fn new(begin: u64, end: u64) -> Self {
        debug_assert!(begin <= end);
        Self { begin, end }
    }

    /// First byte of the skipped range.
    pub fn begin(&self) -> u64 {
        self.begin
    }

    /// First byte past the skipped range.
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn length(&self) -> u64 {
        self.end - self.begin
    }
}

impl fmt::Display for SkippedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

/// How a failed reader can be resumed by `recover()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recoverable {
    /// Not applicable; `recover()` returns `None`.
    No,
    /// A chunk is known to start at the position; recovery jumps there.
    HaveChunk(u64),
    /// Recovery scans block boundaries from the position for the next chunk.
    FindChunk(u64),
}

#[derive(Debug)]
enum State {
    Open,
    /// A failure happened; the message is replayed to callers until the
    /// reader is recovered or closed.
    Failed(String),
    Closed,
}

/// Chunk being assembled: the header fills first, then the payload.
struct PartialChunk {
    header_bytes: [u8; CHUNK_HEADER_SIZE],
    header_filled: usize,
    header: Option<ChunkHeader>,
    data: BytesMut,
}

impl PartialChunk {
    fn new() -> Self {
        Self {
            header_bytes: [0; CHUNK_HEADER_SIZE],
            header_filled: 0,
            header: None,
            data: BytesMut::new(),
        }
    }

    fn reset(&mut self) {
        self.header_filled = 0;
        self.header = None;
        self.data.clear();
    }
}

/// Block header being assembled; refilled each time the source crosses a
/// block boundary. `filled` always equals the source's offset within the
/// header region while a fill is in progress.
struct PartialBlockHeader {
    bytes: [u8; BLOCK_HEADER_SIZE as usize],
    filled: usize,
}

impl PartialBlockHeader {
    fn new() -> Self {
        Self {
            bytes: [0; BLOCK_HEADER_SIZE as usize],
            filled: 0,
        }
    }
}

/// Which chunk boundary `seek_to_chunk` resolves a position to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WhichChunk {
    Containing,
    Before,
    After,
}

/// Reads chunks of a Riegeli/records stream.
///
/// `pos()` is always the boundary of the next chunk to be yielded (except
/// that when the source ends inside a skipped region it can be a block
/// boundary past the end of the source). A successful `read_chunk` leaves
/// `pos()` at the boundary of the following chunk.
///
/// To read through a source without giving it up, construct the reader over
/// `&mut source`; closing the reader then leaves the source open.
pub struct ChunkReader<S: ByteReader> {
    source: S,

    /// Start of the next chunk to be yielded.
    pos: u64,

    /// The source ended in the middle of the chunk at `pos`. Not a failure
    /// until `close()`.
    truncated: bool,

    /// Source position captured at close time; the end of the truncated
    /// tail reported by a post-close `recover()`.
    truncated_end: u64,

    chunk: PartialChunk,

    block_header: PartialBlockHeader,

    recoverable: Recoverable,

    state: State,
}

impl<S: ByteReader> ChunkReader<S> {
    /// Creates a reader that yields chunks starting at the source's current
    /// position, which must be a chunk boundary.
    pub fn new(source: S) -> Self {
        let pos = source.pos();
        Self {
            source,
            pos,
            truncated: false,
            truncated_end: 0,
            chunk: PartialChunk::new(),
            block_header: PartialBlockHeader::new(),
            recoverable: Recoverable::No,
            state: State::Open,
        }
    }

    /// The current position: the boundary of the chunk the next `read_chunk`
    /// yields. Unchanged by `close()`.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Whether the reader is open and not failed.
    pub fn healthy(&self) -> bool {
        matches!(self.state, State::Open)
    }

    /// Whether the reader has been closed.
    pub fn closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// Whether the source ended in the middle of a chunk. Reported as an
    /// error by `close()`.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Whether the seek family and `size()` are available.
    pub fn supports_random_access(&self) -> bool {
        self.source.supports_random_access()
    }

    /// Returns a reference to the underlying byte source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Returns a mutable reference to the underlying byte source.
    ///
    /// Moving the source's position directly desynchronises the reader.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Returns the underlying byte source, consuming the reader.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Reads the next chunk.
    ///
    /// Returns [`ChunkPiece::EOF`] when the source has no more chunks; if it
    /// ended in the middle of one, the reader additionally becomes
    /// `truncated()`. Structural corruption fails the reader; `recover()`
    /// can then skip the bad region.
    pub fn read_chunk(&mut self) -> Result<ChunkPiece> {
        self.check_open()?;
        let header = match self.read_chunk_header()? {
            Some(header) => header,
            None => return Ok(ChunkPiece::EOF),
        };

        let data_size = header.data_size as usize;
        while self.chunk.data.len() < data_size {
            if framing::remaining_in_block_header(self.source.pos()) > 0 {
                if self.read_block_header(Some(self.pos))?.is_none() {
                    return Ok(ChunkPiece::EOF);
                }
                continue;
            }
            let take = (data_size - self.chunk.data.len())
                .min(framing::remaining_in_block(self.source.pos()) as usize);
            let old_len = self.chunk.data.len();
            self.chunk.data.resize(old_len + take, 0);
            let n = match self.source.read_full(&mut self.chunk.data[old_len..]) {
                Ok(n) => n,
                Err(e) => return Err(self.fail_io(e)),
            };
            self.chunk.data.truncate(old_len + n);
            if n < take {
                self.reading_failed();
                return Ok(ChunkPiece::EOF);
            }
        }

        if highway_hash(&self.chunk.data) != header.data_hash {
            self.recoverable =
                Recoverable::FindChunk(framing::block_boundary_after_or_at(self.pos + 1));
            return Err(self.fail(ChunkyError::ChunkDataHashMismatch {
                chunk_begin: self.pos,
            }));
        }

        let chunk = Chunk {
            header,
            data: self.chunk.data.split().freeze(),
        };
        self.chunk.reset();
        self.pos = self.source.pos();
        self.truncated = false;
        Ok(ChunkPiece::Chunk(chunk))
    }

    /// Reads the next chunk's header without consuming its payload: the
    /// chunk an immediately following `read_chunk` yields.
    ///
    /// Idempotent; the returned reference is valid until the next operation
    /// that takes `&mut self`. `Ok(None)` means the source ends.
    pub fn pull_chunk_header(&mut self) -> Result<Option<&ChunkHeader>> {
        self.check_open()?;
        match self.read_chunk_header()? {
            Some(_) => Ok(self.chunk.header.as_ref()),
            None => Ok(None),
        }
    }

    /// Ensures the stream looks like a valid records file by reading just
    /// enough to verify the first chunk header, without consuming payload.
    ///
    /// `Ok(false)` means the source ends before a whole header; corruption
    /// is an error like any other read.
    pub fn check_file_format(&mut self) -> Result<bool> {
        Ok(self.pull_chunk_header()?.is_some())
    }

    /// An iterator over the remaining chunks. Stops after the first error.
    pub fn chunks(&mut self) -> Chunks<'_, S> {
        Chunks {
            reader: self,
            done: false,
        }
    }

    /// The size of the source. Requires random access.
    pub fn size(&mut self) -> Result<u64> {
        self.check_open()?;
        match self.source.size() {
            Ok(size) => Ok(size),
            Err(e) => Err(self.fail_io(e)),
        }
    }

    /// Seeks to `new_pos`, which the caller asserts is a chunk boundary.
    /// Requires random access.
    pub fn seek(&mut self, new_pos: u64) -> Result<()> {
        self.check_open()?;
        self.seek_source(new_pos, "seek")?;
        self.clear_transient();
        self.pos = new_pos;
        Ok(())
    }

    /// Seeks to the chunk containing `new_pos`: the nearest boundary at or
    /// before it when `new_pos` is less than `num_records` bytes past that
    /// boundary (a numeric record position in that chunk), otherwise the
    /// nearest boundary at or after it. Requires random access.
    pub fn seek_to_chunk_containing(&mut self, new_pos: u64) -> Result<()> {
        self.seek_to_chunk(new_pos, WhichChunk::Containing)
    }

    /// Seeks to the nearest chunk boundary at or before `new_pos`. Requires
    /// random access.
    pub fn seek_to_chunk_before(&mut self, new_pos: u64) -> Result<()> {
        self.seek_to_chunk(new_pos, WhichChunk::Before)
    }

    /// Seeks to the nearest chunk boundary at or after `new_pos`. Requires
    /// random access.
    pub fn seek_to_chunk_after(&mut self, new_pos: u64) -> Result<()> {
        self.seek_to_chunk(new_pos, WhichChunk::After)
    }

    /// Tries to resume a reader that failed on invalid file contents, or to
    /// account for a truncated tail after a failed `close()`.
    ///
    /// On success returns the region that was skipped and the reader is
    /// healthy again (or stays closed in the post-close case). `Ok(None)`
    /// means there is nothing to recover from: the reader is healthy, or
    /// its failure did not come from file contents.
    pub fn recover(&mut self) -> Result<Option<SkippedRegion>> {
        match &self.state {
            State::Open => Ok(None),
            State::Closed => {
                if self.truncated {
                    self.truncated = false;
                    let region = SkippedRegion::new(self.pos, self.truncated_end);
                    info!("skipping truncated tail {} after close", region);
                    Ok(Some(region))
                } else {
                    Ok(None)
                }
            }
            State::Failed(_) => {
                let begin = self.pos;
                match std::mem::replace(&mut self.recoverable, Recoverable::No) {
                    Recoverable::No => Ok(None),
                    Recoverable::HaveChunk(chunk_begin) => {
                        self.state = State::Open;
                        self.clear_transient();
                        self.advance_source_to(chunk_begin)?;
                        self.pos = chunk_begin;
                        let region = SkippedRegion::new(begin, chunk_begin);
                        info!("recovered at known chunk boundary, skipping {}", region);
                        Ok(Some(region))
                    }
                    Recoverable::FindChunk(from) => {
                        self.state = State::Open;
                        self.clear_transient();
                        self.find_chunk(begin, framing::block_boundary_after_or_at(from))
                    }
                }
            }
        }
    }

    /// Closes the reader, releasing an owned byte source. Idempotent.
    ///
    /// Fails if the reader was failed, or if the source ended in the middle
    /// of a chunk; in the latter case a single `recover()` afterwards
    /// reports the truncated tail.
    pub fn close(&mut self) -> Result<()> {
        if self.closed() {
            return Ok(());
        }
        let failure = match &self.state {
            State::Failed(message) => Some(message.clone()),
            _ => None,
        };
        self.truncated_end = self.source.pos();
        let close_result = self.source.close();
        self.recoverable = Recoverable::No;
        self.state = State::Closed;
        if let Some(message) = failure {
            // The structural failure supersedes any pending truncation.
            self.truncated = false;
            return Err(ChunkyError::ReaderFailed(message));
        }
        close_result?;
        if self.truncated {
            return Err(ChunkyError::Truncated {
                chunk_begin: self.pos,
            });
        }
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        match &self.state {
            State::Open => Ok(()),
            State::Failed(message) => Err(ChunkyError::ReaderFailed(message.clone())),
            State::Closed => Err(ChunkyError::Closed),
        }
    }

    fn fail(&mut self, err: ChunkyError) -> ChunkyError {
        warn!("chunk reader failed: {}", err);
        self.state = State::Failed(err.to_string());
        err
    }

    fn fail_io(&mut self, err: ChunkyError) -> ChunkyError {
        self.recoverable = Recoverable::No;
        self.fail(err)
    }

    /// Interprets the source ending during a read: truncation if any byte
    /// of the chunk at `pos` (or of a block header inside it) was consumed.
    fn reading_failed(&mut self) {
        if self.source.pos() > self.pos {
            self.truncated = true;
        }
    }

    fn clear_transient(&mut self) {
        self.chunk.reset();
        self.block_header.filled = 0;
        self.truncated = false;
    }

    /// Reads or continues reading the chunk header of the chunk at `pos`,
    /// completing any block header the source position falls into first.
    /// `Ok(None)` means the source ends before the header does.
    fn read_chunk_header(&mut self) -> Result<Option<ChunkHeader>> {
        if let Some(header) = self.chunk.header {
            return Ok(Some(header));
        }
        if !framing::is_possible_chunk_boundary(self.pos) {
            self.recoverable =
                Recoverable::FindChunk(framing::block_boundary_after_or_at(self.pos));
            return Err(self.fail(ChunkyError::InvalidChunkBoundary { pos: self.pos }));
        }
        if self.source.pos() < self.pos {
            // The source ended in a skipped region earlier; it may have
            // grown since.
            if !self.advance_source_to(self.pos)? {
                return Ok(None);
            }
        }

        while self.chunk.header_filled < CHUNK_HEADER_SIZE {
            if framing::remaining_in_block_header(self.source.pos()) > 0 {
                if self.read_block_header(Some(self.pos))?.is_none() {
                    return Ok(None);
                }
                continue;
            }
            let filled = self.chunk.header_filled;
            let take = (CHUNK_HEADER_SIZE - filled)
                .min(framing::remaining_in_block(self.source.pos()) as usize);
            let n = match self
                .source
                .read_full(&mut self.chunk.header_bytes[filled..filled + take])
            {
                Ok(n) => n,
                Err(e) => return Err(self.fail_io(e)),
            };
            self.chunk.header_filled += n;
            if n < take {
                self.reading_failed();
                return Ok(None);
            }
        }

        let mut bytes = Bytes::copy_from_slice(&self.chunk.header_bytes);
        match parse_chunk_header(&mut bytes, self.pos) {
            Ok(header) => {
                self.chunk.header = Some(header);
                Ok(Some(header))
            }
            Err(e) => {
                self.recoverable =
                    Recoverable::FindChunk(framing::block_boundary_after_or_at(self.pos + 1));
                Err(self.fail(e))
            }
        }
    }

    /// Reads or continues reading the block header the source position
    /// falls into. When `expected_chunk_begin` is given, a hash-valid
    /// header must agree that the containing chunk starts there; a
    /// disagreement fails the reader but leaves it recoverable at the
    /// chunk boundary the block header vouches for.
    ///
    /// Precondition: `remaining_in_block_header(source.pos()) > 0`.
    /// `Ok(None)` means the source ends inside the header.
    fn read_block_header(
        &mut self,
        expected_chunk_begin: Option<u64>,
    ) -> Result<Option<BlockHeader>> {
        let remaining = framing::remaining_in_block_header(self.source.pos());
        debug_assert!(remaining > 0);
        let start = (BLOCK_HEADER_SIZE - remaining) as usize;
        if start == 0 {
            self.block_header.filled = 0;
        }
        debug_assert_eq!(self.block_header.filled, start);

        let n = match self.source.read_full(&mut self.block_header.bytes[start..]) {
            Ok(n) => n,
            Err(e) => return Err(self.fail_io(e)),
        };
        self.block_header.filled = start + n;
        if self.block_header.filled < BLOCK_HEADER_SIZE as usize {
            self.reading_failed();
            return Ok(None);
        }

        let block_begin = self.source.pos() - BLOCK_HEADER_SIZE;
        let header = match parse_block_header(&self.block_header.bytes, block_begin) {
            Ok(header) => header,
            Err(e) => {
                self.recoverable = Recoverable::FindChunk(block_begin + BLOCK_SIZE);
                return Err(self.fail(e));
            }
        };

        if let Some(chunk_begin) = expected_chunk_begin {
            if header.chunk_begin(block_begin) != chunk_begin {
                // The header is hash-valid, so trust it: the next chunk it
                // points at is a real boundary recovery can jump to.
                self.recoverable =
                    Recoverable::HaveChunk(header.next_chunk_begin(block_begin));
                return Err(self.fail(ChunkyError::ChunkBoundaryInconsistency {
                    chunk_begin,
                    block_begin,
                }));
            }
        }
        Ok(Some(header))
    }

    /// Scans block boundaries from `boundary` for the next valid chunk;
    /// the core of find-chunk recovery. `begin` is where the skipped region
    /// started.
    fn find_chunk(&mut self, begin: u64, mut boundary: u64) -> Result<Option<SkippedRegion>> {
        loop {
            self.pos = boundary;
            if !self.advance_source_to(boundary)? {
                // The rest of the source is part of the skipped region; pos
                // is a block boundary past its end.
                let region = SkippedRegion::new(begin, boundary);
                warn!("no chunk found before end of source, skipping {}", region);
                return Ok(Some(region));
            }

            let header = match self.read_block_header(None) {
                Ok(Some(header)) => header,
                Ok(None) => {
                    // Source ends inside this block header.
                    return Ok(Some(SkippedRegion::new(begin, boundary)));
                }
                Err(e) => {
                    if matches!(self.recoverable, Recoverable::No) {
                        return Err(e);
                    }
                    self.recoverable = Recoverable::No;
                    self.state = State::Open;
                    debug!("block header at {} unusable, trying next block", boundary);
                    boundary += BLOCK_SIZE;
                    continue;
                }
            };

            // The header's next_chunk distance names the candidate, even
            // when a chunk starts at this very boundary.
            let candidate = header.next_chunk_begin(boundary);
            self.clear_transient();
            self.pos = candidate;
            match self.read_chunk_header() {
                Ok(Some(_)) => {
                    let region = SkippedRegion::new(begin, candidate);
                    info!("recovered at chunk boundary {}, skipped {}", candidate, region);
                    return Ok(Some(region));
                }
                Ok(None) => {
                    // The candidate chunk is truncated; it is still the
                    // next chunk boundary.
                    return Ok(Some(SkippedRegion::new(begin, candidate)));
                }
                Err(e) => {
                    // Any verification failure of the candidate sends the
                    // scan to the block after this one, not to wherever
                    // the candidate's own failure pointed.
                    if matches!(self.recoverable, Recoverable::No) {
                        return Err(e);
                    }
                    self.recoverable = Recoverable::No;
                    self.state = State::Open;
                    debug!(
                        "candidate chunk at {} invalid, retrying from block {}",
                        candidate,
                        boundary + BLOCK_SIZE
                    );
                    boundary += BLOCK_SIZE;
                }
            }
        }
    }

    fn seek_to_chunk(&mut self, new_pos: u64, which: WhichChunk) -> Result<()> {
        self.check_open()?;
        if !self.source.supports_random_access() {
            return Err(self.fail(ChunkyError::NotSeekable {
                op: "seek-to-chunk",
            }));
        }

        // Fast path: the target falls inside the chunk whose header is
        // already pulled.
        if let Some(header) = self.chunk.header {
            if self.pos <= new_pos {
                let end = header.chunk_end(self.pos);
                if new_pos < end {
                    let target = if new_pos == self.pos
                        || which == WhichChunk::Before
                        || (which == WhichChunk::Containing
                            && new_pos - self.pos < header.num_records)
                    {
                        self.pos
                    } else {
                        end
                    };
                    if target == self.pos {
                        return Ok(());
                    }
                    return self.seek(target);
                }
            }
        }

        let block_begin = framing::block_boundary_before(new_pos);
        debug!(
            "seek-to-chunk: target {}, reading block header at {}",
            new_pos, block_begin
        );
        self.seek_source(block_begin, "seek-to-chunk")?;
        self.clear_transient();
        self.pos = block_begin;
        let block_header = match self.read_block_header(None)? {
            Some(header) => header,
            // Source ends inside the block header at `block_begin`.
            None => return Ok(()),
        };

        // Chunk starts bracketing new_pos: `lo` begins the chunk containing
        // the boundary, `hi` is the next start after it. Walk forward until
        // new_pos falls in [lo, hi).
        let mut lo = block_header.chunk_begin(block_begin);
        let mut hi = block_header.next_chunk_begin(block_begin);
        while hi <= new_pos {
            match self.pull_header_at(hi)? {
                Some(header) => {
                    lo = hi;
                    hi = header.chunk_end(hi);
                }
                None => {
                    // The source ends at or inside the chunk at `hi`. For
                    // `before` the last chunk known to start is the answer;
                    // otherwise `hi` is the last boundary there is.
                    if which == WhichChunk::Before {
                        return self.seek(lo);
                    }
                    return Ok(());
                }
            }
        }

        let target = match which {
            WhichChunk::Before => lo,
            WhichChunk::After => {
                if new_pos == lo {
                    lo
                } else {
                    hi
                }
            }
            WhichChunk::Containing => {
                if new_pos == lo {
                    lo
                } else {
                    // The walk usually leaves the chunk at `lo` pulled.
                    let lo_header = if self.pos == lo && self.chunk.header.is_some() {
                        self.chunk.header
                    } else {
                        self.pull_header_at(lo)?
                    };
                    match lo_header {
                        Some(header) if new_pos - lo < header.num_records => lo,
                        Some(_) => hi,
                        // Source ends inside the chunk at `lo`; it is still
                        // the boundary the target falls into.
                        None => return Ok(()),
                    }
                }
            }
        };

        if self.pos == target && self.chunk.header.is_some() {
            return Ok(());
        }
        self.seek(target)
    }

    /// Positions the reader at `chunk_begin` and pulls that chunk's header.
    /// `Ok(None)` means the source ends first; `pos` stays at `chunk_begin`.
    fn pull_header_at(&mut self, chunk_begin: u64) -> Result<Option<ChunkHeader>> {
        self.clear_transient();
        self.pos = chunk_begin;
        if self.source.pos() != chunk_begin {
            if !self.advance_source_to(chunk_begin)? {
                return Ok(None);
            }
        }
        self.read_chunk_header()
    }

    /// Moves the source to `target`, or as close to it as the source
    /// reaches. Returns whether the target was reached.
    fn advance_source_to(&mut self, target: u64) -> Result<bool> {
        if self.source.pos() == target {
            return Ok(true);
        }
        if self.source.supports_random_access() {
            let size = match self.source.size() {
                Ok(size) => size,
                Err(e) => return Err(self.fail_io(e)),
            };
            let reachable = target.min(size);
            if let Err(e) = self.source.seek(reachable) {
                return Err(self.fail_io(e));
            }
            Ok(reachable == target)
        } else {
            debug_assert!(self.source.pos() <= target);
            let mut scratch = [0u8; 4096];
            while self.source.pos() < target {
                let want = ((target - self.source.pos()) as usize).min(scratch.len());
                let n = match self.source.read(&mut scratch[..want]) {
                    Ok(n) => n,
                    Err(e) => return Err(self.fail_io(e)),
                };
                if n == 0 {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }

    /// Seeks the source for the seek family; a target past the end of the
    /// source is a failure, unlike reads hitting the end.
    fn seek_source(&mut self, target: u64, op: &'static str) -> Result<()> {
        if !self.source.supports_random_access() {
            return Err(self.fail(ChunkyError::NotSeekable { op }));
        }
        let size = match self.source.size() {
            Ok(size) => size,
            Err(e) => return Err(self.fail_io(e)),
        };
        if target > size {
            return Err(self.fail(ChunkyError::PositionOutOfRange {
                op,
                pos: target,
                size,
            }));
        }
        match self.source.seek(target) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail_io(e)),
        }
    }
}

/// Iterator over chunks, created by [`ChunkReader::chunks`]. Yields
/// `Result<Chunk>` and stops after the end of the source or the first
/// error.
pub struct Chunks<'a, S: ByteReader> {
    reader: &'a mut ChunkReader<S>,
    done: bool,
}

impl<S: ByteReader> Iterator for Chunks<'_, S> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_chunk() {
            Ok(ChunkPiece::Chunk(chunk)) => Some(Ok(chunk)),
            Ok(ChunkPiece::EOF) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
