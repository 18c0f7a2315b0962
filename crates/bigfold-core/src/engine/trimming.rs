use super::fragment::Fragment;
use crate::core::models::system::MolecularSystem;

/// Drops the first `overlap_length` residues of a fragment and renumbers the
/// rest consecutively from `first_number`.
///
/// Returns `None` when no residue would survive, i.e. the fragment is not
/// longer than the overlap.
pub fn trim_and_renumber(
    fragment: &Fragment,
    overlap_length: usize,
    first_number: isize,
) -> Option<MolecularSystem> {
    if fragment.len() <= overlap_length {
        return None;
    }

    let mut trimmed = fragment
        .system()
        .extract_residues(fragment.chain_id(), overlap_length..fragment.len())?;
    let chain_id = trimmed.chains_iter().next().map(|(id, _)| id)?;
    trimmed.renumber_chain(chain_id, first_number)?;
    Some(trimmed)
}
