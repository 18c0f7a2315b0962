//! Side-chain truncation over a residue selection, e.g. every proline of a
//! disordered stretch turned into alanine.

use super::config::ConfigError;
use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::system::MolecularSystem;
use crate::core::utils::identifiers::{
    ALPHA_CARBON, AMIDE_NITROGEN, BETA_CARBON, CARBONYL_CARBON, is_backbone_atom, one_letter_code,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, instrument, warn};

const ALANINE: &str = "ALA";
const GLYCINE: &str = "GLY";
const PROLINE: &str = "PRO";

/// Residues considered by a batch mutation: an optional chain and an optional
/// inclusive residue-number range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidueSelection {
    pub chain: Option<char>,
    pub first: Option<isize>,
    pub last: Option<isize>,
}

impl ResidueSelection {
    pub fn contains(&self, chain: char, number: isize) -> bool {
        self.chain.is_none_or(|c| c == chain)
            && self.first.is_none_or(|first| number >= first)
            && self.last.is_none_or(|last| number <= last)
    }
}

/// Truncates residues named `from` to `to` by renaming them and dropping every
/// side-chain atom the target does not have.
///
/// Only truncations are possible: the target is alanine (keeps `CB`) or
/// glycine (keeps the backbone alone).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    from: String,
    to: String,
}

impl Mutation {
    pub fn new(from: &str, to: &str) -> Result<Self, ConfigError> {
        let from = from.trim().to_ascii_uppercase();
        let to = to.trim().to_ascii_uppercase();
        if one_letter_code(&from).is_none() {
            return Err(ConfigError::InvalidValue {
                parameter: "from_name",
                reason: format!("'{}' is not a known amino acid", from),
            });
        }
        if to != ALANINE && to != GLYCINE {
            return Err(ConfigError::InvalidValue {
                parameter: "to_name",
                reason: format!("only truncation to {} or {} is supported, got '{}'", ALANINE, GLYCINE, to),
            });
        }
        if from == to {
            return Err(ConfigError::InvalidValue {
                parameter: "to_name",
                reason: format!("'{}' would be mutated into itself", from),
            });
        }
        Ok(Self { from, to })
    }

    pub fn from_name(&self) -> &str {
        &self.from
    }

    pub fn to_name(&self) -> &str {
        &self.to
    }

    fn keeps(&self, atom_name: &str) -> bool {
        is_backbone_atom(atom_name) || (self.to == ALANINE && atom_name == BETA_CARBON)
    }
}

impl Default for Mutation {
    fn default() -> Self {
        Self {
            from: PROLINE.to_string(),
            to: ALANINE.to_string(),
        }
    }
}

/// Chain and number of a residue, rendered as `A:42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResidueLabel {
    pub chain: char,
    pub number: isize,
}

impl fmt::Display for ResidueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.number)
    }
}

/// A residue that matched the selection but could not be mutated. The residue
/// is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{residue}: {reason}")]
pub struct MutationIssue {
    pub residue: ResidueLabel,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MutationReport {
    pub mutated: Vec<ResidueLabel>,
    pub issues: Vec<MutationIssue>,
}

impl MutationReport {
    /// Every issue on its own line, for reporting them all at once.
    pub fn issue_summary(&self) -> Option<String> {
        if self.issues.is_empty() {
            return None;
        }
        Some(
            self.issues
                .iter()
                .map(|issue| issue.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

/// Residues of `system` matching `selection` and named like the source of
/// `mutation`, in chain order.
pub fn select_targets(
    system: &MolecularSystem,
    selection: &ResidueSelection,
    mutation: &Mutation,
) -> Vec<(ResidueId, ResidueLabel)> {
    system
        .chains_iter()
        .flat_map(|(_, chain)| chain.residues().iter().map(move |&id| (chain.id, id)))
        .filter_map(|(chain, residue_id)| {
            let residue = system.residue(residue_id)?;
            let label = ResidueLabel {
                chain,
                number: residue.residue_number,
            };
            (!residue.is_hetero
                && residue.name == mutation.from
                && selection.contains(chain, residue.residue_number))
            .then_some((residue_id, label))
        })
        .collect()
}

/// Applies `mutation` to one residue, or explains why it cannot.
pub fn mutate_residue(
    system: &mut MolecularSystem,
    residue_id: ResidueId,
    mutation: &Mutation,
) -> Result<(), String> {
    let residue = system
        .residue(residue_id)
        .ok_or_else(|| "residue no longer exists".to_string())?;

    for required in [AMIDE_NITROGEN, ALPHA_CARBON, CARBONYL_CARBON] {
        if residue.get_atom_id_by_name(required).is_none() {
            return Err(format!("missing backbone atom {}", required));
        }
    }
    if mutation.to == ALANINE && residue.get_atom_id_by_name(BETA_CARBON).is_none() {
        return Err(format!("no {} atom to keep for {}", BETA_CARBON, ALANINE));
    }

    let pruned: Vec<AtomId> = residue
        .atoms()
        .iter()
        .copied()
        .filter(|&id| {
            system
                .atom(id)
                .is_some_and(|atom| !mutation.keeps(&atom.name))
        })
        .collect();

    for atom_id in pruned {
        system.remove_atom(atom_id);
    }
    if let Some(residue) = system.residue_mut(residue_id) {
        residue.name = mutation.to.clone();
    }
    Ok(())
}

/// Mutates every selected residue, collecting failures instead of stopping
/// at the first one.
#[instrument(skip_all, name = "batch_mutation", fields(from = %mutation.from, to = %mutation.to))]
pub fn mutate_residues(
    system: &mut MolecularSystem,
    selection: &ResidueSelection,
    mutation: &Mutation,
) -> MutationReport {
    let mut report = MutationReport::default();
    for (residue_id, label) in select_targets(system, selection, mutation) {
        match mutate_residue(system, residue_id, mutation) {
            Ok(()) => {
                debug!("{} {} -> {}", label, mutation.from, mutation.to);
                report.mutated.push(label);
            }
            Err(reason) => report.issues.push(MutationIssue {
                residue: label,
                reason,
            }),
        }
    }

    if let Some(summary) = report.issue_summary() {
        warn!(
            count = report.issues.len(),
            "Some residues could not be mutated:\n{}", summary
        );
    }
    report
}
