use super::atom::Atom;
use super::chain::{Chain, ChainType};
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::Residue;
use super::topology::{Bond, BondKind};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::HashMap;
use std::ops::Range;

/// A complete molecular structure: chains of residues of atoms, plus bonds.
///
/// Both the fragment models produced by the structure oracle and the growing
/// assembled model are represented by this type. Residues are addressed by
/// stable [`ResidueId`]s, while their order along a chain is the order of
/// [`Chain::residues`]. Residue numbers are unique within a chain.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Primary storage for atoms.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains.
    chains: SlotMap<ChainId, Chain>,
    /// List of all bonds in the system.
    bonds: Vec<Bond>,
    /// Lookup map for finding residues by chain ID and residue number.
    residue_id_map: HashMap<(ChainId, isize), ResidueId>,
    /// Lookup map for finding chains by their single-character identifier.
    chain_id_map: HashMap<char, ChainId>,
    /// Cached adjacency list for bond connectivity, indexed by atom ID.
    bond_adjacency: SecondaryMap<AtomId, Vec<AtomId>>,
}

impl MolecularSystem {
    /// Creates a new, empty molecular system.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn atoms_iter_mut(&mut self) -> impl Iterator<Item = (AtomId, &mut Atom)> {
        self.atoms.iter_mut()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn residue_mut(&mut self, id: ResidueId) -> Option<&mut Residue> {
        self.residues.get_mut(id)
    }

    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.residues.iter()
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn chain_mut(&mut self, id: ChainId) -> Option<&mut Chain> {
        self.chains.get_mut(id)
    }

    /// Iterates chains in creation order.
    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chains.iter()
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    /// Finds a residue by its chain and residue number.
    pub fn find_residue_by_number(
        &self,
        chain_id: ChainId,
        residue_number: isize,
    ) -> Option<ResidueId> {
        self.residue_id_map
            .get(&(chain_id, residue_number))
            .copied()
    }

    /// Looks up an atom of a residue by name.
    pub fn residue_atom(&self, residue_id: ResidueId, atom_name: &str) -> Option<&Atom> {
        let atom_id = self.residue(residue_id)?.get_atom_id_by_name(atom_name)?;
        self.atom(atom_id)
    }

    /// Adds a new chain or returns the existing one with the same identifier.
    pub fn add_chain(&mut self, id: char, chain_type: ChainType) -> ChainId {
        *self.chain_id_map.entry(id).or_insert_with(|| {
            let chain = Chain::new(id, chain_type);
            self.chains.insert(chain)
        })
    }

    /// Adds a residue at the end of a chain, or returns the existing residue
    /// with the same number.
    ///
    /// Returns `None` if the chain does not exist.
    pub fn add_residue(
        &mut self,
        chain_id: ChainId,
        residue_number: isize,
        name: &str,
    ) -> Option<ResidueId> {
        let chain = self.chains.get_mut(chain_id)?;
        let key = (chain_id, residue_number);

        let residue_id = *self.residue_id_map.entry(key).or_insert_with(|| {
            let residue = Residue::new(residue_number, name, chain_id);
            self.residues.insert(residue)
        });

        if !chain.residues.contains(&residue_id) {
            chain.residues.push(residue_id);
        }

        Some(residue_id)
    }

    /// Inserts an atom and registers it with its residue.
    ///
    /// Returns `None` if the residue does not exist.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, mut atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }

        atom.residue_id = residue_id;
        let name = atom.name.clone();

        let atom_id = self.atoms.insert(atom);
        self.bond_adjacency.insert(atom_id, Vec::new());

        self.residues.get_mut(residue_id)?.add_atom(&name, atom_id);

        Some(atom_id)
    }

    /// Adds a bond between two atoms. Adding an existing bond is a no-op.
    ///
    /// Returns `None` if either atom does not exist.
    pub fn add_bond(&mut self, atom1_id: AtomId, atom2_id: AtomId, kind: BondKind) -> Option<()> {
        if !self.atoms.contains_key(atom1_id) || !self.atoms.contains_key(atom2_id) {
            return None;
        }

        if let Some(neighbors) = self.bond_adjacency.get(atom1_id) {
            if neighbors.contains(&atom2_id) {
                return Some(());
            }
        }

        self.bonds.push(Bond::new(atom1_id, atom2_id, kind));
        self.bond_adjacency[atom1_id].push(atom2_id);
        self.bond_adjacency[atom2_id].push(atom1_id);
        Some(())
    }

    /// Removes an atom together with its bonds.
    pub fn remove_atom(&mut self, atom_id: AtomId) -> Option<Atom> {
        let atom = self.atoms.remove(atom_id)?;

        if let Some(residue) = self.residues.get_mut(atom.residue_id) {
            residue.remove_atom(&atom.name, atom_id);
        }

        self.bonds.retain(|bond| !bond.contains(atom_id));

        let neighbors = self.bond_adjacency.remove(atom_id).unwrap_or_default();
        for neighbor_id in neighbors {
            if let Some(adjacency) = self.bond_adjacency.get_mut(neighbor_id) {
                adjacency.retain(|&id| id != atom_id);
            }
        }

        Some(atom)
    }

    /// Removes a residue, its atoms and every bond touching them.
    pub fn remove_residue(&mut self, residue_id: ResidueId) -> Option<Residue> {
        let atom_ids = self.residues.get(residue_id)?.atoms().to_vec();
        for atom_id in atom_ids {
            self.remove_atom(atom_id);
        }

        let residue = self.residues.remove(residue_id)?;

        if let Some(chain) = self.chains.get_mut(residue.chain_id) {
            chain.residues.retain(|&id| id != residue_id);
        }
        self.residue_id_map
            .remove(&(residue.chain_id, residue.residue_number));

        Some(residue)
    }

    pub fn get_bonded_neighbors(&self, atom_id: AtomId) -> Option<&[AtomId]> {
        self.bond_adjacency.get(atom_id).map(|v| v.as_slice())
    }

    /// Renumbers every residue of a chain consecutively, in chain order,
    /// starting at `first_number`.
    ///
    /// Returns `None` if the chain does not exist.
    pub fn renumber_chain(&mut self, chain_id: ChainId, first_number: isize) -> Option<()> {
        let residue_ids = self.chains.get(chain_id)?.residues.clone();

        for residue_id in &residue_ids {
            if let Some(residue) = self.residues.get(*residue_id) {
                self.residue_id_map
                    .remove(&(chain_id, residue.residue_number));
            }
        }

        for (offset, residue_id) in residue_ids.into_iter().enumerate() {
            let number = first_number + offset as isize;
            if let Some(residue) = self.residues.get_mut(residue_id) {
                residue.residue_number = number;
                self.residue_id_map.insert((chain_id, number), residue_id);
            }
        }

        Some(())
    }

    /// Copies residues (with their atoms and internal bonds) from another system
    /// to the end of `target_chain`, keeping their residue numbers.
    ///
    /// Returns the IDs of the new residues in this system, or `None` if the
    /// target chain is missing, a source residue is missing, or a residue number
    /// is already taken in the target chain.
    pub fn append_residues(
        &mut self,
        target_chain: ChainId,
        source: &MolecularSystem,
        source_residues: &[ResidueId],
    ) -> Option<Vec<ResidueId>> {
        if !self.chains.contains_key(target_chain) {
            return None;
        }
        for &source_id in source_residues {
            let number = source.residue(source_id)?.residue_number;
            if self.find_residue_by_number(target_chain, number).is_some() {
                return None;
            }
        }

        let mut atom_map: HashMap<AtomId, AtomId> = HashMap::new();
        let mut new_ids = Vec::with_capacity(source_residues.len());

        for &source_id in source_residues {
            let source_residue = source.residue(source_id)?;
            let new_id = self.add_residue(
                target_chain,
                source_residue.residue_number,
                &source_residue.name,
            )?;
            {
                let residue = self.residues.get_mut(new_id)?;
                residue.confidence = source_residue.confidence;
                residue.is_hetero = source_residue.is_hetero;
            }
            for &source_atom_id in source_residue.atoms() {
                let atom = source.atom(source_atom_id)?.clone();
                let new_atom_id = self.add_atom_to_residue(new_id, atom)?;
                atom_map.insert(source_atom_id, new_atom_id);
            }
            new_ids.push(new_id);
        }

        for bond in source.bonds() {
            if let (Some(&a1), Some(&a2)) = (atom_map.get(&bond.atom1_id), atom_map.get(&bond.atom2_id))
            {
                self.add_bond(a1, a2, bond.kind);
            }
        }

        Some(new_ids)
    }

    /// Builds a new system holding the residues at chain positions `range`.
    ///
    /// Returns `None` if the chain is missing or the range is out of bounds.
    pub fn extract_residues(&self, chain_id: ChainId, range: Range<usize>) -> Option<MolecularSystem> {
        let chain = self.chain(chain_id)?;
        let selected = chain.residues.get(range)?;

        let mut extracted = MolecularSystem::new();
        let new_chain = extracted.add_chain(chain.id, chain.chain_type);
        extracted.append_residues(new_chain, self, selected)?;
        Some(extracted)
    }
}
