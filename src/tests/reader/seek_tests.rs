//! The seek family: `seek`, `seek_to_chunk_{containing,before,after}`.

use crate::byte_reader::StreamReader;
use crate::error::ChunkyError;
use crate::reader::{ChunkPiece, ChunkReader};
use crate::tests::utils::{init_logs, payload, reader_over, FileBuilder};

struct SeekFile {
    data: Vec<u8>,
    payloads: Vec<Vec<u8>>,
    boundaries: Vec<u64>,
    end: u64,
}

/// Four chunks: a small one, one spanning a block boundary, one with a
/// small record count for the `containing` band tests, and a trailing one.
fn seek_file() -> SeekFile {
    let payloads = vec![
        payload(1, 1000),
        payload(2, 100_000),
        payload(3, 500),
        payload(4, 200),
    ];
    let mut builder = FileBuilder::new();
    builder.append_chunk(&payloads[0]);
    builder.append_chunk(&payloads[1]);
    builder.append_chunk_with_records(&payloads[2], 5);
    builder.append_chunk(&payloads[3]);
    SeekFile {
        data: builder.build(),
        payloads,
        boundaries: builder.boundaries().to_vec(),
        end: builder.end_pos(),
    }
}

fn assert_reads_chunk(reader: &mut ChunkReader<impl crate::byte_reader::ByteReader>, expected: &[u8]) {
    match reader.read_chunk().unwrap() {
        ChunkPiece::Chunk(chunk) => assert_eq!(&chunk.data[..], expected),
        ChunkPiece::EOF => panic!("expected a chunk"),
    }
}

#[test]
fn seek_to_chunk_boundaries_and_back() {
    let file = seek_file();
    let mut reader = reader_over(file.data);

    reader.seek(file.boundaries[2]).unwrap();
    assert_eq!(reader.pos(), file.boundaries[2]);
    assert_reads_chunk(&mut reader, &file.payloads[2]);

    reader.seek(file.boundaries[0]).unwrap();
    assert_reads_chunk(&mut reader, &file.payloads[0]);

    assert_eq!(reader.size().unwrap(), file.end);
}

#[test]
fn seek_past_end_of_source_fails() {
    let file = seek_file();
    let mut reader = reader_over(file.data);
    match reader.seek(file.end + 1) {
        Err(ChunkyError::PositionOutOfRange { pos, size, .. }) => {
            assert_eq!(pos, file.end + 1);
            assert_eq!(size, file.end);
        }
        other => panic!("expected PositionOutOfRange, got {:?}", other),
    }
    assert!(!reader.healthy());
}

#[test]
fn seek_to_chunk_after_at_and_past_a_boundary() {
    init_logs();
    let file = seek_file();
    let mut reader = reader_over(file.data);

    // Exactly at a chunk boundary: that chunk.
    reader.seek_to_chunk_after(file.boundaries[2]).unwrap();
    assert_eq!(reader.pos(), file.boundaries[2]);
    assert_reads_chunk(&mut reader, &file.payloads[2]);

    // One byte past it: the next chunk.
    reader.seek_to_chunk_after(file.boundaries[2] + 1).unwrap();
    assert_eq!(reader.pos(), file.boundaries[3]);
    assert_reads_chunk(&mut reader, &file.payloads[3]);
}

#[test]
fn seek_to_chunk_before_lands_on_the_enclosing_chunk() {
    let file = seek_file();
    let mut reader = reader_over(file.data);

    reader.seek_to_chunk_before(file.boundaries[2]).unwrap();
    assert_eq!(reader.pos(), file.boundaries[2]);

    // One byte earlier is inside the big chunk.
    reader.seek_to_chunk_before(file.boundaries[2] - 1).unwrap();
    assert_eq!(reader.pos(), file.boundaries[1]);
    assert_reads_chunk(&mut reader, &file.payloads[1]);
}

#[test]
fn seeks_into_a_later_block_of_a_spanning_chunk() {
    // 70000 is inside the second block, in the middle of the big chunk; the
    // block header's previous_chunk distance locates the chunk's start.
    let file = seek_file();
    let mut reader = reader_over(file.data);

    reader.seek_to_chunk_before(70_000).unwrap();
    assert_eq!(reader.pos(), file.boundaries[1]);

    reader.seek_to_chunk_after(70_000).unwrap();
    assert_eq!(reader.pos(), file.boundaries[2]);
}

#[test]
fn seek_to_chunk_containing_band_is_strict() {
    let file = seek_file();
    let b2 = file.boundaries[2];
    let mut reader = reader_over(file.data);

    // The third chunk reports 5 records: positions b2..b2+5 are numeric
    // record positions inside it.
    reader.seek_to_chunk_containing(b2).unwrap();
    assert_eq!(reader.pos(), b2);

    reader.seek_to_chunk_containing(b2 + 4).unwrap();
    assert_eq!(reader.pos(), b2);

    // Exactly num_records bytes past the boundary is the next chunk.
    reader.seek_to_chunk_containing(b2 + 5).unwrap();
    assert_eq!(reader.pos(), file.boundaries[3]);
}

#[test]
fn seek_to_chunk_containing_within_the_first_chunk() {
    let file = seek_file();
    let mut reader = reader_over(file.data);
    reader.seek_to_chunk_containing(500).unwrap();
    assert_eq!(reader.pos(), 0);
    assert_reads_chunk(&mut reader, &file.payloads[0]);
}

#[test]
fn seek_to_chunk_reuses_a_pulled_header() {
    let file = seek_file();
    let mut reader = reader_over(file.data);

    let pulled = *reader.pull_chunk_header().unwrap().unwrap();
    reader.seek_to_chunk_containing(10).unwrap();
    assert_eq!(reader.pos(), 0);
    match reader.read_chunk().unwrap() {
        ChunkPiece::Chunk(chunk) => assert_eq!(chunk.header, pulled),
        ChunkPiece::EOF => panic!("expected a chunk"),
    }

    // From the pulled header the reader knows where this chunk ends.
    reader.seek(0).unwrap();
    reader.pull_chunk_header().unwrap().unwrap();
    reader.seek_to_chunk_after(10).unwrap();
    assert_eq!(reader.pos(), file.boundaries[1]);
    assert_reads_chunk(&mut reader, &file.payloads[1]);
}

#[test]
fn seek_to_chunk_after_the_last_chunk_reports_eof() {
    let file = seek_file();
    let mut reader = reader_over(file.data);
    reader.seek_to_chunk_after(file.end).unwrap();
    assert_eq!(reader.pos(), file.end);
    assert!(matches!(reader.read_chunk().unwrap(), ChunkPiece::EOF));
    assert!(reader.healthy());
}

#[test]
fn seeking_requires_random_access() {
    let file = seek_file();
    let mut reader = ChunkReader::new(StreamReader::new(&file.data[..]));

    match reader.seek_to_chunk_after(10) {
        Err(ChunkyError::NotSeekable { .. }) => {}
        other => panic!("expected NotSeekable, got {:?}", other),
    }
    assert!(!reader.healthy());

    // Not a file-contents failure: recover has nothing to do.
    assert!(reader.recover().unwrap().is_none());
    assert!(matches!(reader.close(), Err(ChunkyError::ReaderFailed(_))));
}

#[test]
fn reading_after_a_bad_seek_recovers_at_the_next_chunk() {
    // The caller is responsible for seeking to real chunk boundaries; a
    // position inside chunk data produces a structural failure that
    // recover() resolves at the next block's chunk.
    let file = seek_file();
    let mut reader = reader_over(file.data);

    reader.seek(file.boundaries[0] + 30).unwrap();
    assert!(reader.read_chunk().is_err());
    assert!(!reader.healthy());

    let region = reader.recover().unwrap().unwrap();
    assert_eq!(region.begin(), file.boundaries[0] + 30);
    assert_eq!(region.end(), file.boundaries[2]);
    assert_reads_chunk(&mut reader, &file.payloads[2]);
}
