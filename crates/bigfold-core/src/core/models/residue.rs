use super::ids::{AtomId, ChainId};
use crate::core::utils::identifiers::one_letter_code;
use std::collections::HashMap;

/// A residue of a fragment or assembled model.
///
/// `confidence` is the per-residue predicted quality reported by the structure
/// oracle (pLDDT for AlphaFold-style predictors). It is the only per-residue
/// scalar the reassembly pipeline reads or writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub residue_number: isize,  // Residue sequence number, unique within the chain
    pub name: String,           // Three-letter name (e.g. "ALA")
    pub chain_id: ChainId,      // ID of the parent chain
    pub confidence: f64,        // Per-residue confidence scalar
    pub is_hetero: bool,        // Read from a HETATM record
    pub(crate) atoms: Vec<AtomId>,
    atom_name_map: HashMap<String, AtomId>,
}

impl Residue {
    pub(crate) fn new(residue_number: isize, name: &str, chain_id: ChainId) -> Self {
        Self {
            residue_number,
            name: name.to_string(),
            chain_id,
            confidence: 0.0,
            is_hetero: false,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map
            .entry(atom_name.to_string())
            .or_insert(atom_id);
    }

    pub(crate) fn remove_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.retain(|&id| id != atom_id);
        if self.atom_name_map.get(atom_name) == Some(&atom_id) {
            self.atom_name_map.remove(atom_name);
        }
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    /// Returns the atom carrying `name`; the first one wins when a name repeats.
    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }

    /// One-letter amino acid code of the residue, `'X'` for anything unknown.
    pub fn one_letter_code(&self) -> char {
        one_letter_code(&self.name).unwrap_or('X')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::{AtomId, ChainId};
    use slotmap::KeyData;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    fn dummy_chain_id(n: u64) -> ChainId {
        ChainId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn new_residue_initializes_fields_correctly() {
        let chain_id = dummy_chain_id(1);
        let residue = Residue::new(10, "GLY", chain_id);
        assert_eq!(residue.residue_number, 10);
        assert_eq!(residue.name, "GLY");
        assert_eq!(residue.chain_id, chain_id);
        assert_eq!(residue.confidence, 0.0);
        assert!(!residue.is_hetero);
        assert!(residue.atoms().is_empty());
        assert!(residue.get_atom_id_by_name("CA").is_none());
    }

    #[test]
    fn add_atom_adds_atom_and_maps_name() {
        let mut residue = Residue::new(5, "ALA", dummy_chain_id(2));
        let atom_id = dummy_atom_id(42);
        residue.add_atom("CA", atom_id);
        assert_eq!(residue.atoms(), &[atom_id]);
        assert_eq!(residue.get_atom_id_by_name("CA"), Some(atom_id));
    }

    #[test]
    fn repeated_atom_name_keeps_first_mapping() {
        let mut residue = Residue::new(5, "ALA", dummy_chain_id(2));
        let first = dummy_atom_id(1);
        let second = dummy_atom_id(2);
        residue.add_atom("CA", first);
        residue.add_atom("CA", second);
        assert_eq!(residue.atoms().len(), 2);
        assert_eq!(residue.get_atom_id_by_name("CA"), Some(first));
    }

    #[test]
    fn remove_atom_removes_atom_and_name_mapping() {
        let mut residue = Residue::new(8, "THR", dummy_chain_id(4));
        let atom_id = dummy_atom_id(100);
        residue.add_atom("OG1", atom_id);
        residue.remove_atom("OG1", atom_id);
        assert!(residue.atoms().is_empty());
        assert!(residue.get_atom_id_by_name("OG1").is_none());
    }

    #[test]
    fn remove_atom_does_nothing_if_atom_not_present() {
        let mut residue = Residue::new(9, "VAL", dummy_chain_id(5));
        let atom_id = dummy_atom_id(200);
        residue.add_atom("CG1", atom_id);
        residue.remove_atom("CG2", dummy_atom_id(201));
        assert_eq!(residue.atoms(), &[atom_id]);
        assert_eq!(residue.get_atom_id_by_name("CG1"), Some(atom_id));
    }

    #[test]
    fn one_letter_code_maps_standard_and_unknown_names() {
        let chain_id = dummy_chain_id(6);
        assert_eq!(Residue::new(1, "TRP", chain_id).one_letter_code(), 'W');
        assert_eq!(Residue::new(2, "HOH", chain_id).one_letter_code(), 'X');
    }
}
