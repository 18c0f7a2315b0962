use super::ids::AtomId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Origin of a bond record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondKind {
    /// Connectivity read from the input structure (e.g. `CONECT` records).
    #[default]
    Covalent,
    /// Backbone C–N linkage formed while joining two fragments.
    Peptide,
}

#[derive(Debug, Error)]
#[error("Invalid bond kind string")]
pub struct ParseBondKindError;

impl FromStr for BondKind {
    type Err = ParseBondKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "covalent" => Ok(Self::Covalent),
            "peptide" => Ok(Self::Peptide),
            _ => Err(ParseBondKindError),
        }
    }
}

impl fmt::Display for BondKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Covalent => "Covalent",
                Self::Peptide => "Peptide",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1_id: AtomId,
    pub atom2_id: AtomId,
    pub kind: BondKind,
}

impl Bond {
    pub fn new(atom1_id: AtomId, atom2_id: AtomId, kind: BondKind) -> Self {
        Self {
            atom1_id,
            atom2_id,
            kind,
        }
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }
}
