//! # Workflows Module
//!
//! Top-level entry points tying `core` and `engine` together.
//!
//! - **Segmentation** ([`segment`]) - Sequence records to overlapping chunk sets.
//! - **Reassembly** ([`assemble`]) - Fragment discovery, ordered reassembly and the
//!   run report.
//! - **Mutation** ([`mutate`]) - Batch truncation of selected residues, e.g. prolines to alanines.
//!
//! All workflows take their configuration and a progress reporter explicitly;
//! nothing is read from global state.

pub mod assemble;
pub mod mutate;
pub mod segment;
