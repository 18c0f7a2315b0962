use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::{Atom, AtomRole};
use crate::core::models::chain::ChainType;
use crate::core::models::ids::AtomId;
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondKind;
use crate::core::utils::identifiers::{AMIDE_NITROGEN, CARBONYL_CARBON};
use nalgebra::Point3;
use pdbtbx::{Format, ReadOptions, StrictnessLevel};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{self, BufRead, BufReader, Read, Write};
use thiserror::Error;
use tracing::{debug, warn};

const CONECT_PARTNERS_PER_LINE: usize = 4;
const COORDINATE_RECORDS: [&str; 3] = ["ATOM", "HETATM", "MODEL"];

/// Non-coordinate records found before the first atom (HEADER, TITLE, REMARK, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    pub header_lines: Vec<String>,
}

impl PdbMetadata {
    pub fn with_remark(text: &str) -> Self {
        Self {
            header_lines: vec![format!("REMARK   1 {}", text)],
        }
    }

    fn from_text(text: &str) -> Self {
        let header_lines = text
            .lines()
            .take_while(|line| !COORDINATE_RECORDS.contains(&record_name(line)))
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        Self { header_lines }
    }
}

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse PDB records: {0}")]
    Parse(String),
    #[error("CONECT record on line {line} needs at least two atom serials")]
    InvalidConect { line: usize },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

fn record_name(line: &str) -> &str {
    line.get(0..6).unwrap_or(line).trim()
}

fn infer_element(atom_name: &str) -> String {
    atom_name
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

// Four-character names start in column 13, shorter ones with a one-letter
// element are shifted right by one.
fn format_atom_name(name: &str, element: &str) -> String {
    if name.len() < 4 && element.len() <= 1 {
        format!(" {:<3}", name)
    } else {
        format!("{:<4}", name)
    }
}

fn parse_conect_serials(line: &str) -> Vec<usize> {
    let fixed: Vec<usize> = (0..5)
        .map(|i| line.get(6 + 5 * i..(11 + 5 * i).min(line.len())).unwrap_or("").trim())
        .take_while(|s| !s.is_empty())
        .map_while(|s| s.parse().ok())
        .collect();
    if fixed.len() >= 2 {
        return fixed;
    }
    line.split_whitespace()
        .skip(1)
        .map_while(|s| s.parse().ok())
        .collect()
}

fn conect_pairs(text: &str) -> Result<Vec<(usize, usize)>, PdbError> {
    let mut pairs = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if record_name(line) != "CONECT" {
            continue;
        }
        let serials = parse_conect_serials(line);
        let Some((&first, partners)) = serials.split_first().filter(|(_, p)| !p.is_empty())
        else {
            return Err(PdbError::InvalidConect { line: index + 1 });
        };
        pairs.extend(partners.iter().map(|&p| (first.min(p), first.max(p))));
    }
    pairs.sort_unstable();
    pairs.dedup();
    Ok(pairs)
}

/// Reader and writer for the fixed-column Protein Data Bank format.
///
/// Records are parsed by `pdbtbx` at loose strictness. Only the first model is
/// kept. The B-factor column carries the per-residue confidence: it is read
/// from the first atom of each residue and written to every atom. Of several
/// alternate locations only the first (blank or lowest label) is kept.
pub struct PdbFile;

impl MolecularFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let (pdb, warnings) = ReadOptions::new()
            .set_format(Format::Pdb)
            .set_level(StrictnessLevel::Loose)
            .read_raw(BufReader::new(text.as_bytes()))
            .map_err(|errors| {
                PdbError::Parse(
                    errors
                        .iter()
                        .map(|e| e.to_string())
                        .collect::<Vec<_>>()
                        .join("; "),
                )
            })?;
        for warning in &warnings {
            debug!("pdbtbx: {}", warning);
        }

        let model = pdb
            .models()
            .next()
            .ok_or_else(|| PdbError::MissingRecord("ATOM/HETATM records".into()))?;

        let mut system = MolecularSystem::new();
        let mut serial_map: HashMap<usize, AtomId> = HashMap::new();

        for chain in model.chains() {
            let chain_char = chain
                .id()
                .chars()
                .find(|c| !c.is_whitespace())
                .unwrap_or('A');

            for residue in chain.residues() {
                let res_seq = residue.serial_number();
                if let Some(code) = residue.insertion_code() {
                    return Err(PdbError::Inconsistency(format!(
                        "Insertion codes are not supported (residue {}:{}{})",
                        chain_char, res_seq, code
                    )));
                }

                let primary_alt = residue
                    .conformers()
                    .filter_map(|c| c.alternative_location())
                    .min();
                let conformers: Vec<_> = residue
                    .conformers()
                    .filter(|c| {
                        c.alternative_location().is_none() || c.alternative_location() == primary_alt
                    })
                    .collect();
                let Some(first_conformer) = conformers.first() else {
                    continue;
                };
                let Some(first_atom) = conformers.iter().flat_map(|c| c.atoms()).next() else {
                    continue;
                };

                let is_hetero = first_atom.hetero();
                let chain_type = if is_hetero {
                    ChainType::Other
                } else {
                    ChainType::Protein
                };
                let chain_id = system.add_chain(chain_char, chain_type);
                if system.find_residue_by_number(chain_id, res_seq).is_some() {
                    return Err(PdbError::Inconsistency(format!(
                        "Residue {}:{} appears in more than one block",
                        chain_char, res_seq
                    )));
                }
                let residue_id = system
                    .add_residue(chain_id, res_seq, first_conformer.name())
                    .ok_or_else(|| {
                        PdbError::Inconsistency(format!(
                            "Chain {} vanished while reading",
                            chain_char
                        ))
                    })?;
                if let Some(residue) = system.residue_mut(residue_id) {
                    residue.confidence = first_atom.b_factor();
                    residue.is_hetero = is_hetero;
                }

                let mut seen_names = HashSet::new();
                for source in conformers.iter().flat_map(|c| c.atoms()) {
                    let name = source.name();
                    if !seen_names.insert(name.to_string()) {
                        continue;
                    }
                    let (x, y, z) = source.pos();
                    let mut atom = Atom::new(name, residue_id, Point3::new(x, y, z));
                    atom.role = AtomRole::classify(name, is_hetero);
                    atom.element = match source.element() {
                        Some(element) => element.symbol().to_ascii_uppercase(),
                        None => infer_element(name),
                    };
                    atom.occupancy = source.occupancy();

                    let atom_id = system
                        .add_atom_to_residue(residue_id, atom)
                        .ok_or_else(|| {
                            PdbError::Inconsistency(format!(
                                "Residue for atom serial {} vanished while reading",
                                source.serial_number()
                            ))
                        })?;
                    if serial_map.insert(source.serial_number(), atom_id).is_some() {
                        return Err(PdbError::Inconsistency(format!(
                            "Duplicate atom serial: {}",
                            source.serial_number()
                        )));
                    }
                }
            }
        }

        if serial_map.is_empty() {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }

        for (s1, s2) in conect_pairs(&text)? {
            let (Some(&a1), Some(&a2)) = (serial_map.get(&s1), serial_map.get(&s2)) else {
                warn!(
                    "Skipping CONECT pair ({}, {}): atom not in the first model or an alternate location.",
                    s1, s2
                );
                continue;
            };
            let kind = classify_bond(&system, a1, a2);
            system.add_bond(a1, a2, kind);
        }

        Ok((system, PdbMetadata::from_text(&text)))
    }

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for line in &metadata.header_lines {
            writeln!(writer, "{}", line)?;
        }

        let mut serials: HashMap<AtomId, usize> = HashMap::new();
        let mut serial = 0usize;

        for (_, chain) in system.chains_iter() {
            let mut last: Option<(&str, isize)> = None;
            for &residue_id in chain.residues() {
                let residue = system.residue(residue_id).ok_or_else(|| {
                    PdbError::Inconsistency(format!("Chain {} lists a missing residue", chain.id))
                })?;
                let record_type = if residue.is_hetero { "HETATM" } else { "ATOM" };
                for &atom_id in residue.atoms() {
                    let atom = system.atom(atom_id).ok_or_else(|| {
                        PdbError::Inconsistency(format!(
                            "Residue {} lists a missing atom",
                            residue.residue_number
                        ))
                    })?;
                    serial += 1;
                    serials.insert(atom_id, serial);
                    writeln!(
                        writer,
                        "{:<6}{:>5} {}{:1}{:>3} {:1}{:>4}{:1}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
                        record_type,
                        serial,
                        format_atom_name(&atom.name, &atom.element),
                        ' ',
                        residue.name,
                        chain.id,
                        residue.residue_number,
                        ' ',
                        atom.position.x,
                        atom.position.y,
                        atom.position.z,
                        atom.occupancy,
                        residue.confidence,
                        atom.element
                    )?;
                }
                last = Some((residue.name.as_str(), residue.residue_number));
            }
            if let Some((res_name, res_seq)) = last {
                serial += 1;
                writeln!(
                    writer,
                    "TER   {:>5}      {:>3} {:1}{:>4}",
                    serial, res_name, chain.id, res_seq
                )?;
            }
        }

        let mut bond_map: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for bond in system.bonds() {
            let (Some(&s1), Some(&s2)) = (serials.get(&bond.atom1_id), serials.get(&bond.atom2_id))
            else {
                return Err(PdbError::Inconsistency(
                    "Bond references an atom that was not written".into(),
                ));
            };
            bond_map.entry(s1).or_default().push(s2);
            bond_map.entry(s2).or_default().push(s1);
        }
        for (serial, partners) in &mut bond_map {
            partners.sort_unstable();
            for group in partners.chunks(CONECT_PARTNERS_PER_LINE) {
                write!(writer, "CONECT{:>5}", serial)?;
                for partner in group {
                    write!(writer, "{:>5}", partner)?;
                }
                writeln!(writer)?;
            }
        }

        writeln!(writer, "END")?;
        Ok(())
    }
}

fn classify_bond(system: &MolecularSystem, a1: AtomId, a2: AtomId) -> BondKind {
    let (Some(atom1), Some(atom2)) = (system.atom(a1), system.atom(a2)) else {
        return BondKind::Covalent;
    };
    let names = (atom1.name.as_str(), atom2.name.as_str());
    let is_c_n = names == (CARBONYL_CARBON, AMIDE_NITROGEN) || names == (AMIDE_NITROGEN, CARBONYL_CARBON);
    if is_c_n && atom1.residue_id != atom2.residue_id {
        BondKind::Peptide
    } else {
        BondKind::Covalent
    }
}
