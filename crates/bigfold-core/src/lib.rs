//! # bigfold Core Library
//!
//! Split-predict-reassemble for protein sequences too long for a single
//! structure-prediction run. A sequence is cut into overlapping segments, each
//! segment is predicted independently by an external tool, and the overlapping
//! fragment models are stitched back into one continuous, consecutively
//! numbered chain.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Molecular data models (`MolecularSystem`), sequence
//!   records and the segmentation algorithm, FASTA/PDB I/O and geometry utilities.
//!
//! - **[`engine`]: The Reassembly Logic.** Configuration, fragment validation and the
//!   individual reassembly steps (anchor alignment, boundary smoothing, trimming,
//!   joining) driven by the `Assembler` state machine.
//!
//! - **[`workflows`]: The Public API.** Complete segmentation and reassembly runs
//!   with progress reporting, as used by the command-line tool.

pub mod core;
pub mod engine;
pub mod workflows;
