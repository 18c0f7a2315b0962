use super::error::AssemblyIssue;
use crate::core::models::ids::ResidueId;
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondKind;
use crate::core::utils::identifiers::{AMIDE_NITROGEN, CARBONYL_CARBON};
use serde::Serialize;
use tracing::{debug, warn};

// C-N distances above this are reported as stretched (ideal peptide bond: 1.33 A).
const STRETCHED_PEPTIDE_DISTANCE: f64 = 2.0;

/// The seam between two consecutive fragments in the assembled chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Junction {
    pub chunk_index: usize,
    pub previous_residue: isize,
    pub next_residue: isize,
    /// C-N distance in Angstroms, when both atoms exist.
    pub distance: Option<f64>,
    pub connected: bool,
}

/// Bonds the carbonyl carbon of `previous` to the amide nitrogen of `next`.
///
/// If either atom is missing the junction is recorded as disconnected and a
/// [`AssemblyIssue::JoinTopology`] is returned alongside it.
pub fn join_residues(
    system: &mut MolecularSystem,
    previous: ResidueId,
    next: ResidueId,
    chunk_index: usize,
) -> (Junction, Option<AssemblyIssue>) {
    let number = |id| system.residue(id).map(|r| r.residue_number).unwrap_or_default();
    let previous_residue = number(previous);
    let next_residue = number(next);

    let carbon = system
        .residue(previous)
        .and_then(|r| r.get_atom_id_by_name(CARBONYL_CARBON));
    let nitrogen = system
        .residue(next)
        .and_then(|r| r.get_atom_id_by_name(AMIDE_NITROGEN));

    let mut junction = Junction {
        chunk_index,
        previous_residue,
        next_residue,
        distance: None,
        connected: false,
    };

    let (Some(carbon), Some(nitrogen)) = (carbon, nitrogen) else {
        let missing = match (carbon, nitrogen) {
            (None, None) => format!(
                "{} of residue {} and {} of residue {}",
                CARBONYL_CARBON, previous_residue, AMIDE_NITROGEN, next_residue
            ),
            (None, _) => format!("{} of residue {}", CARBONYL_CARBON, previous_residue),
            _ => format!("{} of residue {}", AMIDE_NITROGEN, next_residue),
        };
        let issue = AssemblyIssue::JoinTopology {
            chunk_index,
            previous_residue,
            next_residue,
            missing,
        };
        warn!("{}", issue);
        return (junction, Some(issue));
    };

    junction.distance = match (system.atom(carbon), system.atom(nitrogen)) {
        (Some(c), Some(n)) => Some((c.position - n.position).norm()),
        _ => None,
    };
    junction.connected = system.add_bond(carbon, nitrogen, BondKind::Peptide).is_some();

    match junction.distance {
        Some(d) if d > STRETCHED_PEPTIDE_DISTANCE => warn!(
            chunk = chunk_index,
            "Peptide bond {}-{} is stretched to {:.2} A.", previous_residue, next_residue, d
        ),
        Some(d) => debug!(
            chunk = chunk_index,
            "Joined residue {} to {} (C-N {:.2} A).", previous_residue, next_residue, d
        ),
        None => {}
    }

    (junction, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fragment::test_support::backbone_fragment;

    fn residue(system: &MolecularSystem, number: isize) -> ResidueId {
        let chain_id = system.find_chain_by_id('A').unwrap();
        system.find_residue_by_number(chain_id, number).unwrap()
    }

    #[test]
    fn joins_carbon_to_nitrogen_with_peptide_bond() {
        let mut system = backbone_fragment(1, 2, |_| 0.0);
        let (first, second) = (residue(&system, 1), residue(&system, 2));

        let (junction, issue) = join_residues(&mut system, first, second, 3);

        assert!(issue.is_none());
        assert!(junction.connected);
        assert_eq!((junction.previous_residue, junction.next_residue), (1, 2));
        assert!(junction.distance.unwrap() > 0.0);
        assert_eq!(system.bonds().len(), 1);
        assert_eq!(system.bonds()[0].kind, BondKind::Peptide);
    }

    #[test]
    fn missing_nitrogen_marks_junction_disconnected() {
        let mut system = backbone_fragment(1, 2, |_| 0.0);
        let (first, second) = (residue(&system, 1), residue(&system, 2));
        let n = system.residue(second).unwrap().get_atom_id_by_name("N").unwrap();
        system.remove_atom(n).unwrap();

        let (junction, issue) = join_residues(&mut system, first, second, 4);

        assert!(!junction.connected);
        assert_eq!(junction.distance, None);
        assert!(system.bonds().is_empty());
        assert_eq!(
            issue,
            Some(AssemblyIssue::JoinTopology {
                chunk_index: 4,
                previous_residue: 1,
                next_residue: 2,
                missing: "N of residue 2".into(),
            })
        );
    }
}
