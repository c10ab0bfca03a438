use phf::{Map, Set, phf_map, phf_set};

/// Static per-element data used by the chemistry derivations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementData {
    pub atomic_number: u8,
    /// Tabulated valences in ascending order; empty when none is modeled.
    pub valences: &'static [u8],
}

const fn el(atomic_number: u8, valences: &'static [u8]) -> ElementData {
    ElementData {
        atomic_number,
        valences,
    }
}

static ELEMENTS: Map<&'static str, ElementData> = phf_map! {
    "H" => el(1, &[1]), "He" => el(2, &[0]),
    "Li" => el(3, &[1]), "Be" => el(4, &[2]), "B" => el(5, &[3]), "C" => el(6, &[4]),
    "N" => el(7, &[3, 5]), "O" => el(8, &[2]), "F" => el(9, &[1]), "Ne" => el(10, &[0]),
    "Na" => el(11, &[1]), "Mg" => el(12, &[2]), "Al" => el(13, &[3]), "Si" => el(14, &[4]),
    "P" => el(15, &[3, 5]), "S" => el(16, &[2, 4, 6]), "Cl" => el(17, &[1, 3, 5, 7]),
    "Ar" => el(18, &[0]),
    "K" => el(19, &[1]), "Ca" => el(20, &[2]), "Sc" => el(21, &[3]), "Ti" => el(22, &[2, 3, 4]),
    "V" => el(23, &[2, 3, 4, 5]), "Cr" => el(24, &[2, 3, 6]), "Mn" => el(25, &[2, 3, 4, 6, 7]),
    "Fe" => el(26, &[2, 3]), "Co" => el(27, &[2, 3]), "Ni" => el(28, &[2, 3]),
    "Cu" => el(29, &[1, 2]), "Zn" => el(30, &[2]), "Ga" => el(31, &[3]), "Ge" => el(32, &[4]),
    "As" => el(33, &[3, 5]), "Se" => el(34, &[2, 4, 6]), "Br" => el(35, &[1, 3, 5, 7]),
    "Kr" => el(36, &[0, 2]),
    "Rb" => el(37, &[1]), "Sr" => el(38, &[2]), "Y" => el(39, &[3]), "Zr" => el(40, &[4]),
    "Nb" => el(41, &[3, 5]), "Mo" => el(42, &[2, 3, 4, 5, 6]), "Tc" => el(43, &[7]),
    "Ru" => el(44, &[2, 3, 4]), "Rh" => el(45, &[3]), "Pd" => el(46, &[2, 4]),
    "Ag" => el(47, &[1]), "Cd" => el(48, &[2]), "In" => el(49, &[3]), "Sn" => el(50, &[2, 4]),
    "Sb" => el(51, &[3, 5]), "Te" => el(52, &[2, 4, 6]), "I" => el(53, &[1, 3, 5, 7]),
    "Xe" => el(54, &[0, 2, 4, 6]),
    "Cs" => el(55, &[1]), "Ba" => el(56, &[2]), "W" => el(74, &[2, 3, 4, 5, 6]),
    "Os" => el(76, &[2, 3, 4, 6, 8]), "Ir" => el(77, &[3, 4]), "Pt" => el(78, &[2, 4]),
    "Au" => el(79, &[1, 3]), "Hg" => el(80, &[1, 2]), "Tl" => el(81, &[1, 3]),
    "Pb" => el(82, &[2, 4]), "Bi" => el(83, &[3, 5]), "U" => el(92, &[3, 4, 5, 6]),
};

/// Elements SMILES may write without brackets (when neutral and isotope-free).
static ORGANIC_SUBSET: Set<&'static str> = phf_set! {
    "B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I",
};

pub fn element_data(symbol: &str) -> Option<&'static ElementData> {
    ELEMENTS.get(symbol.trim())
}

/// Atomic number of an element symbol, `0` for unknown symbols and pseudo-atoms.
pub fn atomic_number(symbol: &str) -> u8 {
    element_data(symbol).map_or(0, |data| data.atomic_number)
}

pub fn valences(symbol: &str) -> &'static [u8] {
    element_data(symbol).map_or(&[], |data| data.valences)
}

/// The largest tabulated valence, or `None` when the element has no valence model.
pub fn max_valence(symbol: &str) -> Option<u8> {
    valences(symbol).last().copied()
}

pub fn is_organic_subset(symbol: &str) -> bool {
    ORGANIC_SUBSET.contains(symbol)
}

pub fn is_known_element(symbol: &str) -> bool {
    element_data(symbol).is_some()
}
