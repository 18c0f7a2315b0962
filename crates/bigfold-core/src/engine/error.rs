use serde::Serialize;
use thiserror::Error;

use super::config::ConfigError;

/// Failures that stop an assembly run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Fragment for chunk {chunk_index} is invalid: {reason}")]
    InvalidFragment { chunk_index: usize, reason: String },

    #[error("Chunk index {0} was supplied more than once")]
    DuplicateChunk(usize),

    #[error("Chunk {got} arrived after chunk {previous}; fragments must be supplied in chunk order")]
    OutOfOrder { previous: usize, got: usize },

    #[error("No fragments were supplied")]
    NoFragments,

    #[error("Assembly has already finished")]
    AlreadyFinished,

    #[error("Internal logic error: {0}")]
    Internal(String),
}

/// A recoverable problem met while folding a fragment into the model.
///
/// Issues never abort a run on their own; they are collected and reported
/// together once assembly is over.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AssemblyIssue {
    #[error(
        "Chunk {chunk_index}: fragment has {residue_count} residues, not more than the overlap of {overlap_length}; nothing left to append"
    )]
    ShortFragment {
        chunk_index: usize,
        residue_count: usize,
        overlap_length: usize,
    },

    #[error("Chunk {chunk_index}: degenerate anchor alignment ({detail})")]
    AlignmentDegeneracy {
        chunk_index: usize,
        requested_span: usize,
        used_pairs: usize,
        detail: String,
    },

    #[error(
        "Chunk {chunk_index}: cannot link residue {previous_residue} to {next_residue}: missing {missing}"
    )]
    JoinTopology {
        chunk_index: usize,
        previous_residue: isize,
        next_residue: isize,
        missing: String,
    },
}

impl AssemblyIssue {
    pub fn chunk_index(&self) -> usize {
        match self {
            AssemblyIssue::ShortFragment { chunk_index, .. }
            | AssemblyIssue::AlignmentDegeneracy { chunk_index, .. }
            | AssemblyIssue::JoinTopology { chunk_index, .. } => *chunk_index,
        }
    }
}
