use phf::{Map, Set, phf_map, phf_set};

/// Alpha carbon; the anchor atom used for superposing fragments.
pub const ALPHA_CARBON: &str = "CA";
/// Carbonyl carbon; the C-terminal side of a peptide bond.
pub const CARBONYL_CARBON: &str = "C";
/// Amide nitrogen; the N-terminal side of a peptide bond.
pub const AMIDE_NITROGEN: &str = "N";
/// Beta carbon; the only side-chain atom left by a truncation to alanine.
pub const BETA_CARBON: &str = "CB";

static BACKBONE_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N", "H", "HN", "CA", "HA", "C", "O", "OXT", "H1", "H2", "H3", "NT",
    "HT1", "HT2", "HT3", "OT1", "OT2", "HC", "HOXT", "HA1", "HA2", "HA3", "1HA", "2HA",
};

static THREE_TO_ONE: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
    "GLN" => 'Q', "GLU" => 'E', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
    "SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',
    // Protonation and modified variants seen in predicted models
    "HSE" => 'H', "HSD" => 'H', "HSP" => 'H', "HIE" => 'H', "HID" => 'H', "HIP" => 'H',
    "MSE" => 'M', "SEC" => 'U', "PYL" => 'O',
};

// Standard residues plus the IUPAC ambiguity codes accepted by predictors.
static RESIDUE_ALPHABET: Set<char> = phf_set! {
    'A', 'R', 'N', 'D', 'C', 'Q', 'E', 'G', 'H', 'I',
    'L', 'K', 'M', 'F', 'P', 'S', 'T', 'W', 'Y', 'V',
    'U', 'O', 'B', 'Z', 'J', 'X',
};

pub fn is_backbone_atom(atom_name: &str) -> bool {
    BACKBONE_ATOM_NAMES.contains(atom_name.trim())
}

/// Maps a three-letter residue name to its one-letter code.
pub fn one_letter_code(residue_name: &str) -> Option<char> {
    THREE_TO_ONE
        .get(residue_name.trim().to_ascii_uppercase().as_str())
        .copied()
}

/// Whether `symbol` belongs to the residue alphabet accepted in sequences.
pub fn is_residue_symbol(symbol: char) -> bool {
    RESIDUE_ALPHABET.contains(&symbol.to_ascii_uppercase())
}
