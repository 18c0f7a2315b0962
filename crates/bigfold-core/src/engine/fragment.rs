use super::error::EngineError;
use crate::core::models::ids::{ChainId, ResidueId};
use crate::core::models::system::MolecularSystem;
use crate::core::utils::geometry::RigidTransform;

/// A predicted structure for one chunk, validated for reassembly.
///
/// A fragment holds exactly one chain with at least one residue, and every
/// residue carries at least one atom. Residue order is the chain order; residue
/// numbers are whatever the predictor wrote (normally 1-based and chunk-local).
#[derive(Debug, Clone)]
pub struct Fragment {
    chunk_index: usize,
    chain_id: ChainId,
    system: MolecularSystem,
}

impl Fragment {
    pub fn new(chunk_index: usize, system: MolecularSystem) -> Result<Self, EngineError> {
        let invalid = |reason: String| EngineError::InvalidFragment {
            chunk_index,
            reason,
        };

        if chunk_index == 0 {
            return Err(invalid("chunk indices start at 1".into()));
        }
        if system.chain_count() != 1 {
            return Err(invalid(format!(
                "expected exactly one chain, found {}",
                system.chain_count()
            )));
        }
        let (chain_id, chain) = system
            .chains_iter()
            .next()
            .ok_or_else(|| invalid("no chain".into()))?;
        if chain.is_empty() {
            return Err(invalid("the chain has no residues".into()));
        }
        for &residue_id in chain.residues() {
            let residue = system
                .residue(residue_id)
                .ok_or_else(|| invalid("the chain lists a missing residue".into()))?;
            if residue.atoms().is_empty() {
                return Err(invalid(format!(
                    "residue {} has no atoms",
                    residue.residue_number
                )));
            }
        }

        Ok(Self {
            chunk_index,
            chain_id,
            system,
        })
    }

    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn system(&self) -> &MolecularSystem {
        &self.system
    }

    pub fn into_system(self) -> MolecularSystem {
        self.system
    }

    /// Residues in chain order.
    pub fn residue_ids(&self) -> &[ResidueId] {
        self.system
            .chain(self.chain_id)
            .map(|c| c.residues())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.residue_ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.residue_ids().is_empty()
    }

    /// Returns a moved copy of the fragment; `self` is left untouched.
    pub fn transformed(&self, transform: &RigidTransform) -> Self {
        Self {
            chunk_index: self.chunk_index,
            chain_id: self.chain_id,
            system: transform.transformed(&self.system),
        }
    }
}
