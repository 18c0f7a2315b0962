use super::alignment::AnchorPairing;
use super::fragment::Fragment;
use crate::core::models::system::MolecularSystem;
use serde::Serialize;
use tracing::info;

/// A confidence value rewritten on an already assembled residue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceUpdate {
    pub chunk_index: usize,
    pub residue_number: isize,
    pub old: f64,
    pub new: f64,
}

/// Copies confidence from the fragment's overlap window onto the matching
/// tail residues of the assembled model.
///
/// Each assembled residue takes the value of its single paired fragment
/// residue; nothing is averaged and nothing beyond the pairing is touched.
pub fn smooth_boundary(
    assembled: &mut MolecularSystem,
    fragment: &Fragment,
    pairing: &AnchorPairing,
) -> Vec<ConfidenceUpdate> {
    let mut updates = Vec::with_capacity(pairing.span());

    for &(assembled_id, fragment_id) in &pairing.pairs {
        let Some(new) = fragment.system().residue(fragment_id).map(|r| r.confidence) else {
            continue;
        };
        let Some(residue) = assembled.residue_mut(assembled_id) else {
            continue;
        };

        let old = residue.confidence;
        residue.confidence = new;
        info!(
            chunk = fragment.chunk_index(),
            "Changing confidence of residue {} from {:.2} to {:.2}",
            residue.residue_number,
            old,
            new
        );
        updates.push(ConfidenceUpdate {
            chunk_index: fragment.chunk_index(),
            residue_number: residue.residue_number,
            old,
            new,
        });
    }

    updates
}
