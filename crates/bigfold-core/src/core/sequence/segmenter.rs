use super::chunk::{Chunk, ChunkLayout, ChunkSet};
use super::record::SequenceRecord;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    #[error("Segment length must be positive")]
    ZeroSegmentLength,
    #[error("Overlap length ({overlap}) must be smaller than segment length ({segment})")]
    OverlapTooLarge { segment: usize, overlap: usize },
    #[error("Sequence '{0}' is empty")]
    EmptySequence(String),
    #[error("Sequence '{id}' has non-ASCII symbol '{symbol}' at residue {position}")]
    NonAsciiResidue {
        id: String,
        position: usize,
        symbol: char,
    },
}

/// Cuts a sequence into overlapping chunks.
///
/// A sequence that fits into one segment yields a single [`ChunkLayout::Whole`]
/// chunk. Otherwise chunk `i` (0-based) starts at `i * (segment - overlap)` and
/// runs for `segment_length` residues, clipped to the sequence end; the last
/// chunk always ends on the final residue. Consecutive chunks share exactly
/// `overlap_length` residues.
///
/// # Errors
///
/// Fails before producing anything if `segment_length` is zero, if
/// `overlap_length >= segment_length`, if the sequence is empty, or if it holds
/// a non-ASCII symbol.
pub fn segment(
    record: &SequenceRecord,
    segment_length: usize,
    overlap_length: usize,
) -> Result<ChunkSet, SegmentError> {
    if segment_length == 0 {
        return Err(SegmentError::ZeroSegmentLength);
    }
    if overlap_length >= segment_length {
        return Err(SegmentError::OverlapTooLarge {
            segment: segment_length,
            overlap: overlap_length,
        });
    }
    if record.is_empty() {
        return Err(SegmentError::EmptySequence(record.id.clone()));
    }
    if let Some((position, symbol)) = record.first_non_ascii() {
        return Err(SegmentError::NonAsciiResidue {
            id: record.id.clone(),
            position,
            symbol,
        });
    }

    let total = record.len();
    let make_chunk = |index: usize, start: usize, end: usize| Chunk {
        parent_id: record.id.clone(),
        index,
        start: start + 1,
        end,
        residues: record.residues[start..end].to_string(),
    };

    if segment_length >= total {
        return Ok(ChunkSet::new(
            record.id.clone(),
            ChunkLayout::Whole,
            vec![make_chunk(1, 0, total)],
        ));
    }

    let stride = segment_length - overlap_length;
    let mut chunks = Vec::with_capacity((total - overlap_length).div_ceil(stride));
    for i in 0.. {
        let start = i * stride;
        let end = (start + segment_length).min(total);
        chunks.push(make_chunk(i + 1, start, end));
        if end == total {
            break;
        }
    }

    Ok(ChunkSet::new(record.id.clone(), ChunkLayout::Segmented, chunks))
}
