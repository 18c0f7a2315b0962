use crate::core::models::system::MolecularSystem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use thiserror::Error;

/// One line of a per-residue report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidueRow {
    pub chain: char,
    pub number: isize,
    pub name: String,
    pub code: char,
    pub confidence: f64,
    pub atoms: usize,
}

impl fmt::Display for ResidueRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{} ({})", self.chain, self.number, self.code)
    }
}

#[derive(Debug, Error)]
pub enum ResidueTableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lists every residue of `system`, chain by chain, in chain order.
pub fn residue_rows(system: &MolecularSystem) -> Vec<ResidueRow> {
    system
        .chains_iter()
        .flat_map(|(_, chain)| {
            chain.residues().iter().filter_map(move |&residue_id| {
                let residue = system.residue(residue_id)?;
                Some(ResidueRow {
                    chain: chain.id,
                    number: residue.residue_number,
                    name: residue.name.clone(),
                    code: residue.one_letter_code(),
                    confidence: residue.confidence,
                    atoms: residue.atoms().len(),
                })
            })
        })
        .collect()
}

pub fn write_csv(rows: &[ResidueRow], writer: impl Write) -> Result<(), ResidueTableError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn read_csv(reader: impl Read) -> Result<Vec<ResidueRow>, ResidueTableError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<ResidueRow>() {
        rows.push(result?);
    }
    Ok(rows)
}
