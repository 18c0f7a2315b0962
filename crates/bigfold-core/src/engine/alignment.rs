use super::fragment::Fragment;
use crate::core::models::ids::ResidueId;
use crate::core::models::system::MolecularSystem;
use crate::core::utils::geometry::{self, Determinacy, RigidTransform};
use crate::core::utils::identifiers::ALPHA_CARBON;
use tracing::{debug, warn};

/// Residues matched across the seam between the assembled model and a new
/// fragment.
///
/// The last `span` residues of the assembled chain are paired, in order, with
/// fragment residues `overlap - span + 1 ..= overlap` (1-based positions). The
/// same pairing drives both the anchor alignment and the confidence smoothing.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorPairing {
    pub requested_span: usize,
    /// `(assembled residue, fragment residue)` in chain order.
    pub pairs: Vec<(ResidueId, ResidueId)>,
}

impl AnchorPairing {
    pub fn span(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_clamped(&self) -> bool {
        self.pairs.len() < self.requested_span
    }
}

/// Pairs the assembled tail with the fragment's overlap window, shrinking the
/// span to whatever both sides can provide.
pub fn pair_anchor_residues(
    assembled_tail: &[ResidueId],
    fragment: &Fragment,
    overlap_length: usize,
    align_span: usize,
) -> AnchorPairing {
    let fragment_residues = fragment.residue_ids();
    let window_end = overlap_length.min(fragment_residues.len());
    let span = align_span.min(window_end).min(assembled_tail.len());

    let assembled = &assembled_tail[assembled_tail.len() - span..];
    let incoming = &fragment_residues[window_end - span..window_end];

    AnchorPairing {
        requested_span: align_span,
        pairs: assembled.iter().copied().zip(incoming.iter().copied()).collect(),
    }
}

/// Outcome of fitting a fragment onto the assembled model.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub transform: RigidTransform,
    /// `None` when no anchor pair was usable and the fragment stays in place.
    pub determinacy: Option<Determinacy>,
    pub used_pairs: usize,
    /// Anchor RMSD after superposition, in Angstroms.
    pub rmsd: Option<f64>,
    /// Human-readable reasons the fit was degenerate; empty for a clean fit.
    pub degeneracies: Vec<String>,
}

/// Computes the rigid transform that superposes the fragment's anchor `CA`
/// atoms onto the assembled model's.
///
/// The fit is reflection-free least squares. Pairs missing a `CA` on either
/// side are dropped; fewer than three non-collinear points fall back to the
/// minimal rotation described in [`geometry::superpose`].
pub fn align_fragment(
    assembled: &MolecularSystem,
    fragment: &Fragment,
    pairing: &AnchorPairing,
) -> Alignment {
    let mut degeneracies = Vec::new();
    if pairing.is_clamped() {
        degeneracies.push(format!(
            "anchor span reduced from {} to {}",
            pairing.requested_span,
            pairing.span()
        ));
    }

    let mut targets = Vec::with_capacity(pairing.span());
    let mut mobiles = Vec::with_capacity(pairing.span());
    for &(assembled_id, fragment_id) in &pairing.pairs {
        let target = assembled.residue_atom(assembled_id, ALPHA_CARBON);
        let mobile = fragment.system().residue_atom(fragment_id, ALPHA_CARBON);
        if let (Some(target), Some(mobile)) = (target, mobile) {
            targets.push(target.position);
            mobiles.push(mobile.position);
        }
    }
    let dropped = pairing.span() - targets.len();
    if dropped > 0 {
        degeneracies.push(format!("{} anchor pair(s) lack a {} atom", dropped, ALPHA_CARBON));
    }

    let Some((transform, determinacy)) = geometry::superpose(&mobiles, &targets) else {
        degeneracies.push("no usable anchor pairs; fragment left in place".into());
        for detail in &degeneracies {
            warn!(chunk = fragment.chunk_index(), "Alignment degenerate: {}", detail);
        }
        return Alignment {
            transform: RigidTransform::identity(),
            determinacy: None,
            used_pairs: 0,
            rmsd: None,
            degeneracies,
        };
    };

    match determinacy {
        Determinacy::Full => {}
        Determinacy::Collinear => {
            degeneracies.push("anchor atoms are collinear; rotation about the anchor line is arbitrary".into())
        }
        Determinacy::SinglePoint => {
            degeneracies.push("single anchor atom; translation only".into())
        }
    }

    let moved: Vec<_> = mobiles.iter().map(|p| transform.apply(p)).collect();
    let rmsd = geometry::calculate_rmsd(&moved, &targets);

    for detail in &degeneracies {
        warn!(chunk = fragment.chunk_index(), "Alignment degenerate: {}", detail);
    }
    debug!(
        chunk = fragment.chunk_index(),
        pairs = targets.len(),
        rmsd = rmsd.unwrap_or_default(),
        "Anchor alignment computed."
    );

    Alignment {
        transform,
        determinacy: Some(determinacy),
        used_pairs: targets.len(),
        rmsd,
        degeneracies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fragment::test_support::{backbone_fragment, helix_atom};
    use nalgebra::{Rotation3, Vector3};

    fn assembled_tail(system: &MolecularSystem) -> Vec<ResidueId> {
        let chain_id = system.find_chain_by_id('A').unwrap();
        system.chain(chain_id).unwrap().residues().to_vec()
    }

    #[test]
    fn pairing_uses_tail_and_overlap_window() {
        let assembled = backbone_fragment(1, 20, |_| 0.0);
        let fragment = Fragment::new(2, backbone_fragment(11, 30, |_| 0.0)).unwrap();
        let tail = assembled_tail(&assembled);

        let pairing = pair_anchor_residues(&tail, &fragment, 10, 3);

        assert_eq!(pairing.span(), 3);
        assert!(!pairing.is_clamped());
        let numbers: Vec<_> = pairing
            .pairs
            .iter()
            .map(|&(a, f)| {
                (
                    assembled.residue(a).unwrap().residue_number,
                    fragment.system().residue(f).unwrap().residue_number,
                )
            })
            .collect();
        assert_eq!(numbers, vec![(18, 8), (19, 9), (20, 10)]);
    }

    #[test]
    fn pairing_clamps_to_available_residues() {
        let assembled = backbone_fragment(1, 2, |_| 0.0);
        let fragment = Fragment::new(2, backbone_fragment(1, 10, |_| 0.0)).unwrap();
        let tail = assembled_tail(&assembled);

        let by_tail = pair_anchor_residues(&tail, &fragment, 4, 5);
        assert_eq!(by_tail.span(), 2);
        assert!(by_tail.is_clamped());

        let by_overlap = pair_anchor_residues(&tail, &fragment, 1, 5);
        assert_eq!(by_overlap.span(), 1);

        let none = pair_anchor_residues(&tail, &fragment, 0, 5);
        assert_eq!(none.span(), 0);
    }

    #[test]
    fn recovers_the_frame_of_a_moved_fragment() {
        let assembled = backbone_fragment(1, 20, |_| 0.0);
        let truth = RigidTransform::new(
            Rotation3::from_euler_angles(0.3, -1.1, 2.0),
            Vector3::new(12.0, -4.0, 7.5),
        );
        let fragment = Fragment::new(2, backbone_fragment(11, 30, |_| 0.0))
            .unwrap()
            .transformed(&truth);
        let pairing = pair_anchor_residues(&assembled_tail(&assembled), &fragment, 10, 5);

        let alignment = align_fragment(&assembled, &fragment, &pairing);

        assert_eq!(alignment.determinacy, Some(Determinacy::Full));
        assert_eq!(alignment.used_pairs, 5);
        assert!(alignment.degeneracies.is_empty());
        assert!(alignment.rmsd.unwrap() < 1e-6);

        let aligned = fragment.transformed(&alignment.transform);
        let last = *aligned.residue_ids().last().unwrap();
        let ca = aligned.system().residue_atom(last, "CA").unwrap().position;
        assert!((ca - helix_atom(30, "CA")).norm() < 1e-6);
    }

    #[test]
    fn missing_anchor_atoms_are_reported() {
        let assembled = backbone_fragment(1, 20, |_| 0.0);
        let mut system = backbone_fragment(11, 30, |_| 0.0);
        let chain_id = system.find_chain_by_id('A').unwrap();
        for number in [9, 10] {
            let residue_id = system.find_residue_by_number(chain_id, number).unwrap();
            let ca = system.residue(residue_id).unwrap().get_atom_id_by_name("CA").unwrap();
            system.remove_atom(ca).unwrap();
        }
        let fragment = Fragment::new(2, system).unwrap();
        let pairing = pair_anchor_residues(&assembled_tail(&assembled), &fragment, 10, 5);

        let alignment = align_fragment(&assembled, &fragment, &pairing);

        assert_eq!(alignment.used_pairs, 3);
        assert_eq!(alignment.degeneracies, vec!["2 anchor pair(s) lack a CA atom"]);
        assert!(alignment.rmsd.unwrap() < 1e-6);
    }

    #[test]
    fn no_usable_pairs_leaves_fragment_in_place() {
        let assembled = backbone_fragment(1, 5, |_| 0.0);
        let fragment = Fragment::new(2, backbone_fragment(3, 10, |_| 0.0)).unwrap();
        let pairing = pair_anchor_residues(&assembled_tail(&assembled), &fragment, 0, 5);

        let alignment = align_fragment(&assembled, &fragment, &pairing);

        assert_eq!(alignment.transform, RigidTransform::identity());
        assert_eq!(alignment.determinacy, None);
        assert_eq!(alignment.degeneracies.len(), 2);
    }

    #[test]
    fn single_anchor_gives_translation_only() {
        let assembled = backbone_fragment(1, 5, |_| 0.0);
        let fragment = Fragment::new(2, backbone_fragment(5, 10, |_| 0.0)).unwrap();
        let pairing = pair_anchor_residues(&assembled_tail(&assembled), &fragment, 1, 5);

        let alignment = align_fragment(&assembled, &fragment, &pairing);

        assert_eq!(alignment.determinacy, Some(Determinacy::SinglePoint));
        assert_eq!(alignment.degeneracies.len(), 2);
        assert!(alignment.rmsd.unwrap() < 1e-9);
    }
}
