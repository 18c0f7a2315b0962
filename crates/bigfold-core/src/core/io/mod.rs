//! Input/output for the formats the pipeline exchanges with the outside world.
//!
//! Sequences and their chunks travel as FASTA ([`fasta`]); fragment and
//! assembled models as PDB ([`pdb`]), with the per-residue confidence in the
//! B-factor column. [`residue_table`] renders per-residue reports.

pub mod fasta;
pub mod pdb;
pub mod residue_table;
pub mod traits;
