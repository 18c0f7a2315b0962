use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SEGMENT_TAG: &str = "seg";
const SEGMENTS_RECORD_SUFFIX: &str = "_segments";

/// Whether a sequence was emitted as a single chunk or cut into segments.
///
/// The layout only affects naming: a whole chunk is written as `{id}_{s}-{e}` in
/// a record called `{id}`, segments as `{id}_seg{i}_{s}-{e}` in a record called
/// `{id}_segments`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkLayout {
    Whole,
    Segmented,
}

/// One window of a sequence. Boundaries are 1-based and inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub parent_id: String,
    /// Position of the chunk in its set, starting at 1.
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub residues: String,
}

impl Chunk {
    /// Builds a chunk from a parsed header and its residues, checking that the
    /// header boundaries match the residue count.
    pub fn from_header(header: &ChunkHeader, residues: &str) -> Result<Self, ChunkHeaderError> {
        let expected = header.end - header.start + 1;
        if residues.len() != expected {
            return Err(ChunkHeaderError::LengthMismatch {
                header: header.to_string(),
                expected,
                found: residues.len(),
            });
        }
        Ok(Self {
            parent_id: header.parent_id.clone(),
            index: header.index.unwrap_or(1),
            start: header.start,
            end: header.end,
            residues: residues.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn header(&self, layout: ChunkLayout) -> ChunkHeader {
        ChunkHeader {
            parent_id: self.parent_id.clone(),
            index: match layout {
                ChunkLayout::Whole => None,
                ChunkLayout::Segmented => Some(self.index),
            },
            start: self.start,
            end: self.end,
        }
    }
}

/// The name of a chunk record, e.g. `P12345_seg2_1201-1500`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    pub parent_id: String,
    /// `None` for a whole-sequence chunk.
    pub index: Option<usize>,
    pub start: usize,
    pub end: usize,
}

impl ChunkHeader {
    pub fn layout(&self) -> ChunkLayout {
        match self.index {
            Some(_) => ChunkLayout::Segmented,
            None => ChunkLayout::Whole,
        }
    }
}

impl fmt::Display for ChunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(
                f,
                "{}_{}{}_{}-{}",
                self.parent_id, SEGMENT_TAG, index, self.start, self.end
            ),
            None => write!(f, "{}_{}-{}", self.parent_id, self.start, self.end),
        }
    }
}

impl FromStr for ChunkHeader {
    type Err = ChunkHeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let header = s.trim();
        let (head, range) = header
            .rsplit_once('_')
            .ok_or_else(|| ChunkHeaderError::MissingRange(header.to_string()))?;
        let (start, end) = range
            .split_once('-')
            .and_then(|(s, e)| Some((s.parse::<usize>().ok()?, e.parse::<usize>().ok()?)))
            .ok_or_else(|| ChunkHeaderError::MissingRange(header.to_string()))?;
        if start == 0 || end < start {
            return Err(ChunkHeaderError::InvalidRange(header.to_string()));
        }

        let segmented = head.rsplit_once('_').and_then(|(id, tag)| {
            let digits = tag.strip_prefix(SEGMENT_TAG)?;
            if id.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            Some((id, digits.parse::<usize>().ok()?))
        });

        let (parent_id, index) = match segmented {
            Some((id, index)) => (id, Some(index)),
            None => (head, None),
        };
        if parent_id.is_empty() {
            return Err(ChunkHeaderError::MissingRange(header.to_string()));
        }

        Ok(Self {
            parent_id: parent_id.to_string(),
            index,
            start,
            end,
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkHeaderError {
    #[error("Chunk header '{0}' does not end with '_<start>-<end>'")]
    MissingRange(String),
    #[error("Chunk header '{0}' has invalid boundaries")]
    InvalidRange(String),
    #[error("Chunk '{header}' spans {expected} residues but contains {found}")]
    LengthMismatch {
        header: String,
        expected: usize,
        found: usize,
    },
    #[error("Chunk index {0} appears more than once")]
    DuplicateIndex(usize),
    #[error("Chunks belong to different sequences: '{0}' and '{1}'")]
    MixedParents(String, String),
    #[error("A chunk set needs at least one chunk")]
    Empty,
}

/// The ordered chunks of one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSet {
    parent_id: String,
    layout: ChunkLayout,
    chunks: Vec<Chunk>,
}

impl ChunkSet {
    pub(crate) fn new(parent_id: String, layout: ChunkLayout, chunks: Vec<Chunk>) -> Self {
        Self {
            parent_id,
            layout,
            chunks,
        }
    }

    /// Collects chunks recovered in arbitrary order (e.g. read back from a chunk
    /// file) and sorts them by their index.
    pub fn from_chunks(layout: ChunkLayout, mut chunks: Vec<Chunk>) -> Result<Self, ChunkHeaderError> {
        let parent_id = chunks
            .first()
            .map(|c| c.parent_id.clone())
            .ok_or(ChunkHeaderError::Empty)?;

        let mut seen = HashSet::new();
        for chunk in &chunks {
            if chunk.parent_id != parent_id {
                return Err(ChunkHeaderError::MixedParents(
                    parent_id,
                    chunk.parent_id.clone(),
                ));
            }
            if !seen.insert(chunk.index) {
                return Err(ChunkHeaderError::DuplicateIndex(chunk.index));
            }
        }

        chunks.sort_by_key(|c| c.index);
        Ok(Self::new(parent_id, layout, chunks))
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Name of the record (and chunk file stem) holding this set.
    pub fn record_name(&self) -> String {
        match self.layout {
            ChunkLayout::Whole => self.parent_id.clone(),
            ChunkLayout::Segmented => format!("{}{}", self.parent_id, SEGMENTS_RECORD_SUFFIX),
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = ChunkHeader> + '_ {
        self.chunks.iter().map(|c| c.header(self.layout))
    }

    /// Stitches the chunks back into the sequence they were cut from, dropping
    /// the residues each chunk shares with its predecessor.
    pub fn reconstruct_sequence(&self) -> String {
        let mut sequence = String::new();
        let mut covered_to = 0usize;
        for chunk in &self.chunks {
            let skip = (covered_to + 1).saturating_sub(chunk.start);
            if let Some(tail) = chunk.residues.get(skip..) {
                sequence.push_str(tail);
            }
            covered_to = covered_to.max(chunk.end);
        }
        sequence
    }
}

/// Matches fragment files named `{prefix}_seg{N}_*.pdb` and extracts `N`.
#[derive(Debug, Clone)]
pub struct FragmentNamePattern(Regex);

impl FragmentNamePattern {
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let pattern = format!(r"^{}_{}(\d+)_.*\.pdb$", regex::escape(prefix), SEGMENT_TAG);
        Regex::new(&pattern).map(Self)
    }

    pub fn chunk_index(&self, file_name: &str) -> Option<usize> {
        self.0.captures(file_name)?.get(1)?.as_str().parse().ok()
    }
}

/// Extracts the chunk index from a fragment file named `{prefix}_seg{N}_*.pdb`.
pub fn fragment_chunk_index(prefix: &str, file_name: &str) -> Option<usize> {
    FragmentNamePattern::new(prefix).ok()?.chunk_index(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: usize, start: usize, end: usize, residues: &str) -> Chunk {
        Chunk {
            parent_id: "P1".into(),
            index,
            start,
            end,
            residues: residues.into(),
        }
    }

    #[test]
    fn headers_render_by_layout() {
        let c = chunk(2, 1201, 1500, "");
        assert_eq!(c.header(ChunkLayout::Segmented).to_string(), "P1_seg2_1201-1500");
        assert_eq!(c.header(ChunkLayout::Whole).to_string(), "P1_1201-1500");
    }

    #[test]
    fn segmented_header_parses() {
        let header: ChunkHeader = "sp|Q8_HUMAN_seg12_2201-3600".parse().unwrap();
        assert_eq!(header.parent_id, "sp|Q8_HUMAN");
        assert_eq!(header.index, Some(12));
        assert_eq!((header.start, header.end), (2201, 3600));
        assert_eq!(header.layout(), ChunkLayout::Segmented);
    }

    #[test]
    fn whole_header_parses_ids_with_underscores() {
        let header: ChunkHeader = "my_protein_1-1000".parse().unwrap();
        assert_eq!(header.parent_id, "my_protein");
        assert_eq!(header.index, None);
        assert_eq!(header.layout(), ChunkLayout::Whole);
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(matches!(
            "P1".parse::<ChunkHeader>(),
            Err(ChunkHeaderError::MissingRange(_))
        ));
        assert!(matches!(
            "P1_seg1_abc".parse::<ChunkHeader>(),
            Err(ChunkHeaderError::MissingRange(_))
        ));
        assert!(matches!(
            "P1_seg1_10-5".parse::<ChunkHeader>(),
            Err(ChunkHeaderError::InvalidRange(_))
        ));
        assert!(matches!(
            "P1_0-5".parse::<ChunkHeader>(),
            Err(ChunkHeaderError::InvalidRange(_))
        ));
    }

    #[test]
    fn from_header_checks_residue_count() {
        let header: ChunkHeader = "P1_seg1_1-4".parse().unwrap();
        assert_eq!(Chunk::from_header(&header, "MKVL").unwrap().index, 1);
        assert_eq!(
            Chunk::from_header(&header, "MKV"),
            Err(ChunkHeaderError::LengthMismatch {
                header: "P1_seg1_1-4".into(),
                expected: 4,
                found: 3,
            })
        );
    }

    #[test]
    fn from_chunks_sorts_by_index() {
        let set = ChunkSet::from_chunks(
            ChunkLayout::Segmented,
            vec![chunk(3, 7, 9, "GHI"), chunk(1, 1, 4, "ABCD"), chunk(2, 4, 7, "DEFG")],
        )
        .unwrap();

        let indices: Vec<_> = set.chunks().iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(set.record_name(), "P1_segments");
        assert_eq!(set.reconstruct_sequence(), "ABCDEFGHI");
    }

    #[test]
    fn from_chunks_rejects_duplicates_and_mixed_parents() {
        assert_eq!(
            ChunkSet::from_chunks(
                ChunkLayout::Segmented,
                vec![chunk(1, 1, 2, "AB"), chunk(1, 1, 2, "AB")]
            ),
            Err(ChunkHeaderError::DuplicateIndex(1))
        );

        let mut other = chunk(2, 2, 3, "BC");
        other.parent_id = "P2".into();
        assert!(matches!(
            ChunkSet::from_chunks(ChunkLayout::Segmented, vec![chunk(1, 1, 2, "AB"), other]),
            Err(ChunkHeaderError::MixedParents(_, _))
        ));
        assert_eq!(
            ChunkSet::from_chunks(ChunkLayout::Whole, vec![]),
            Err(ChunkHeaderError::Empty)
        );
    }

    #[test]
    fn fragment_chunk_index_matches_naming_scheme() {
        assert_eq!(fragment_chunk_index("P1", "P1_seg3_unrelaxed_rank_001.pdb"), Some(3));
        assert_eq!(fragment_chunk_index("P1", "P1_seg12_x.pdb"), Some(12));
        assert_eq!(fragment_chunk_index("P1", "P1_seg3.pdb"), None);
        assert_eq!(fragment_chunk_index("P1", "P1_segA_x.pdb"), None);
        assert_eq!(fragment_chunk_index("P1", "P1_seg3_x.cif"), None);
        assert_eq!(fragment_chunk_index("P1", "P2_seg3_x.pdb"), None);
        assert_eq!(fragment_chunk_index("P", "P1_seg3_x.pdb"), None);
    }

    #[test]
    fn fragment_prefix_is_matched_literally() {
        let pattern = FragmentNamePattern::new("sp|Q8.1").unwrap();
        assert_eq!(pattern.chunk_index("sp|Q8.1_seg4_model.pdb"), Some(4));
        assert_eq!(pattern.chunk_index("sp|Q8X1_seg4_model.pdb"), None);
        assert_eq!(pattern.chunk_index("xsp|Q8.1_seg4_model.pdb"), None);
    }

    #[test]
    fn overlapping_chunks_reconstruct_without_duplicates() {
        let set = ChunkSet::from_chunks(
            ChunkLayout::Segmented,
            vec![chunk(1, 1, 5, "MKVLA"), chunk(2, 4, 8, "LAGHT"), chunk(3, 7, 9, "HTW")],
        )
        .unwrap();
        assert_eq!(set.reconstruct_sequence(), "MKVLAGHTW");
    }
}
