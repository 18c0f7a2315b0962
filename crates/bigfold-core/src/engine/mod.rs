//! # Engine Module
//!
//! The reassembly machinery: validated fragments go in, one continuous model
//! comes out.
//!
//! - **Configuration** ([`config`]) - Segmentation and assembly parameters with validating builders
//! - **Fragments** ([`fragment`]) - The validated boundary type for predicted chunk structures
//! - **Anchor Alignment** ([`alignment`]) - Seam pairing and least-squares fitting on `CA` atoms
//! - **Boundary Smoothing** ([`smoothing`]) - Confidence hand-over across the seam
//! - **Trimming** ([`trimming`]) - Overlap removal and renumbering
//! - **Joining** ([`joining`]) - Peptide linkage between consecutive fragments
//! - **Mutation** ([`mutation`]) - Batch side-chain truncation over a residue selection
//! - **Assembly** ([`assembler`]) - The `Empty -> Accumulating -> Done` driver tying the steps together
//! - **Errors and Progress** ([`error`], [`progress`]) - Fatal errors, recoverable issues and progress events

pub mod alignment;
pub mod assembler;
pub mod config;
pub mod error;
pub mod fragment;
pub mod joining;
pub mod mutation;
pub mod progress;
pub mod smoothing;
pub mod trimming;
