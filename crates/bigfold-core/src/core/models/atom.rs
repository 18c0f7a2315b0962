use super::ids::ResidueId;
use crate::core::utils::identifiers::is_backbone_atom;
use nalgebra::Point3;
use std::str::FromStr;

/// Classifies an atom by the part of the residue it belongs to.
///
/// Backbone atoms are the ones the reassembly algorithms care about: `CA` drives
/// the anchor alignment and `C`/`N` carry the peptide linkage between fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AtomRole {
    /// Main-chain atom (N, CA, C, O and their hydrogens).
    Backbone,
    /// Side-chain atom of a standard residue.
    Sidechain,
    /// Atom of a non-polymer residue (`HETATM` record).
    Hetero,
    #[default]
    Other,
}

impl AtomRole {
    /// Derives the role of a polymer atom from its name.
    pub fn classify(atom_name: &str, is_hetero: bool) -> Self {
        if is_hetero {
            AtomRole::Hetero
        } else if is_backbone_atom(atom_name) {
            AtomRole::Backbone
        } else {
            AtomRole::Sidechain
        }
    }
}

/// A single atom with its coordinates.
///
/// Confidence is not stored here: the oracle reports one value per
/// residue, so it lives on [`Residue`](super::residue::Residue) and is replicated
/// onto atoms only when a structure is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom name as it appears in the structure file (e.g. "CA").
    pub name: String,
    /// The ID of the parent residue.
    pub residue_id: ResidueId,
    pub role: AtomRole,
    /// Element symbol, upper case (e.g. "C", "SE"). May be empty when unknown.
    pub element: String,
    /// Cartesian position in Angstroms.
    pub position: Point3<f64>,
    pub occupancy: f64,
}

impl Atom {
    /// Creates a new `Atom` with full occupancy and an unknown element.
    pub fn new(name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            residue_id,
            role: AtomRole::default(),
            element: String::new(),
            position,
            occupancy: 1.0,
        }
    }
}

impl FromStr for AtomRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "backbone" => Ok(AtomRole::Backbone),
            "sidechain" | "side-chain" | "side_chain" => Ok(AtomRole::Sidechain),
            "hetero" | "hetatm" => Ok(AtomRole::Hetero),
            "other" | "unknown" => Ok(AtomRole::Other),
            _ => Err(()),
        }
    }
}
