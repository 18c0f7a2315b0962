//! # Core Models Module
//!
//! Data structures for the molecular models handled by bigfold: fragment
//! models produced by the structure oracle and the assembled model built from
//! them share the same representation.
//!
//! - [`atom`] - Atoms with names, roles and coordinates
//! - [`residue`] - Residues with their per-residue confidence scalar
//! - [`chain`] - Ordered residue chains
//! - [`system`] - The complete [`system::MolecularSystem`]
//! - [`topology`] - Bond records
//! - [`ids`] - Stable slot-map handles for atoms, residues and chains
//!
//! ```ignore
//! use bigfold::core::models::{atom::Atom, chain::ChainType, system::MolecularSystem};
//!
//! let mut system = MolecularSystem::new();
//! let chain_id = system.add_chain('A', ChainType::Protein);
//! let residue_id = system.add_residue(chain_id, 1, "ALA").unwrap();
//! system.add_atom_to_residue(residue_id, Atom::new("CA", residue_id, Point3::origin()));
//! ```

pub mod atom;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod system;
pub mod topology;
