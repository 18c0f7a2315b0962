//! # Core Module
//!
//! Stateless building blocks shared by the engine and the workflows.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, chains and systems
//!   backed by slot maps.
//! - **Sequences** ([`sequence`]) - Sequence records, overlapping chunks and the
//!   segmentation algorithm with its naming scheme.
//! - **File I/O** ([`io`]) - FASTA, PDB and per-residue tabular reports.
//! - **Utilities** ([`utils`]) - Rigid-body superposition and residue/atom identifiers.

pub mod io;
pub mod models;
pub mod sequence;
pub mod utils;
