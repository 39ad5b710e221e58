//! The abstract byte source consumed by the chunk reader.
//!
//! The chunk reader only needs positional reads plus, for the seek family,
//! random access. Concrete sources adapt to [`ByteReader`]; this module
//! ships adapters for the two common `std::io` shapes and a borrowed form
//! for sources whose lifetime outlives the reader.

use std::io::{Read, Seek, SeekFrom};

use crate::error::{ChunkyError, Result};

/// A positioned byte source.
///
/// Implementations track their own position so the reader never has to ask
/// the operating system where it is. `read` may return fewer bytes than
/// requested; `Ok(0)` means the source has ended at the current position
/// (the source may still grow later, and a subsequent `read` at the same
/// position may succeed).
pub trait ByteReader {
    /// The current position.
    fn pos(&self) -> u64;

    /// Reads up to `buf.len()` bytes, advancing the position by the number
    /// of bytes read. `Ok(0)` signals end of source.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Reads until `buf` is full or the source ends. Returns the number of
    /// bytes read; anything short of `buf.len()` means end of source.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Whether `seek` and `size` are available.
    fn supports_random_access(&self) -> bool {
        false
    }

    /// Repositions the source. Required iff random access is supported.
    fn seek(&mut self, pos: u64) -> Result<()> {
        let _ = pos;
        Err(ChunkyError::NotSeekable { op: "seek" })
    }

    /// The total size of the source. Required iff random access is
    /// supported.
    fn size(&mut self) -> Result<u64> {
        Err(ChunkyError::NotSeekable { op: "size" })
    }

    /// Releases the source. Only meaningful for owned sources; the borrowed
    /// impl below makes this a no-op.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// The borrowed form of a byte source: everything forwards to the referent
/// except `close`, which leaves the underlying source untouched. A
/// `ChunkReader` over `&mut S` therefore releases nothing when closed.
impl<T: ByteReader + ?Sized> ByteReader for &mut T {
    fn pos(&self) -> u64 {
        (**self).pos()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn supports_random_access(&self) -> bool {
        (**self).supports_random_access()
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        (**self).seek(pos)
    }

    fn size(&mut self) -> Result<u64> {
        (**self).size()
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Random-access adapter around any `Read + Seek` source.
///
/// Tracks the position itself as reads and seeks occur instead of calling
/// `stream_position()` per operation.
pub struct PositionedReader<S: Read + Seek> {
    source: S,
    position: u64,
}

impl<S: Read + Seek> PositionedReader<S> {
    /// Wraps `source`, starting at its current position.
    pub fn new(mut source: S) -> Result<Self> {
        let position = source.stream_position()?;
        Ok(Self { source, position })
    }

    /// Returns a reference to the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Returns a mutable reference to the underlying source.
    ///
    /// Seeking the source directly desynchronises the tracked position.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Returns the underlying source, consuming self.
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: Read + Seek> ByteReader for PositionedReader<S> {
    fn pos(&self) -> u64 {
        self.position
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.source.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }

    fn supports_random_access(&self) -> bool {
        true
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.position = self.source.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    fn size(&mut self) -> Result<u64> {
        let size = self.source.seek(SeekFrom::End(0))?;
        self.source.seek(SeekFrom::Start(self.position))?;
        Ok(size)
    }
}

/// Sequential-only adapter around any `Read` source. Reading and recovery
/// work; the seek family reports the source as not seekable.
pub struct StreamReader<S: Read> {
    source: S,
    position: u64,
}

impl<S: Read> StreamReader<S> {
    /// Wraps `source`; the current position is taken to be 0.
    pub fn new(source: S) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    /// Returns the underlying source, consuming self.
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: Read> ByteReader for StreamReader<S> {
    fn pos(&self) -> u64 {
        self.position
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.source.read(buf)?;
        self.position += n as u64;
        Ok(n)
    }
}
