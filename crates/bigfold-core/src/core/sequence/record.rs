use crate::core::utils::identifiers::is_residue_symbol;

/// A named biological sequence of one-letter residue symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub residues: String,
}

impl SequenceRecord {
    /// Creates a record, dropping any whitespace inside `residues`.
    pub fn new(id: impl Into<String>, residues: &str) -> Self {
        Self {
            id: id.into(),
            residues: residues.chars().filter(|c| !c.is_whitespace()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// The first symbol outside ASCII, with its 1-based position.
    pub fn first_non_ascii(&self) -> Option<(usize, char)> {
        self.residues
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_ascii())
            .map(|(i, c)| (i + 1, c))
    }

    /// Symbols outside the residue alphabet, with their 1-based positions.
    ///
    /// Unknown symbols are reported, never rejected: predictors accept a wider
    /// alphabet than the twenty standard amino acids.
    pub fn unknown_symbols(&self) -> Vec<(usize, char)> {
        self.residues
            .chars()
            .enumerate()
            .filter(|(_, c)| !is_residue_symbol(*c))
            .map(|(i, c)| (i + 1, c))
            .collect()
    }
}
