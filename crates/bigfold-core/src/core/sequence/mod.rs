//! Sequences and their overlapping chunks.
//!
//! A [`SequenceRecord`] too long for a single prediction run is cut by
//! [`segment`] into a [`ChunkSet`]: consecutive windows of at most
//! `segment_length` residues, each sharing `overlap_length` residues with its
//! predecessor. Chunk names encode the chunk index and the 1-based inclusive
//! boundaries, so chunks and their predicted fragments can always be put back in
//! order without relying on file-system ordering.

mod chunk;
mod record;
mod segmenter;

pub use chunk::{
    Chunk, ChunkHeader, ChunkHeaderError, ChunkLayout, ChunkSet, FragmentNamePattern,
    fragment_chunk_index,
};
pub use record::SequenceRecord;
pub use segmenter::{SegmentError, segment};
