use super::elements;
use crate::core::models::atom::Atom;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use serde::Serialize;
use slotmap::SecondaryMap;
use std::fmt;
use tracing::trace;

/// Chemistry derived for one atom from the current topology and charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivedChem {
    pub implicit_hydrogens: u8,
    pub bond_order_sum: u32,
    /// Set when the bond-order sum exceeds the element's largest tabulated valence.
    pub valence_error: bool,
}

/// Picks the valence an atom is assumed to satisfy: the smallest tabulated valence that
/// accommodates `bond_order_sum`, falling back to the first tabulated valence.
fn best_valence(valences: &[u8], bond_order_sum: u32) -> Option<u8> {
    valences
        .iter()
        .copied()
        .find(|&v| v as u32 >= bond_order_sum)
        .or_else(|| valences.first().copied())
}

fn derive(atom: &Atom, bond_order_sum: u32) -> DerivedChem {
    let valences = elements::valences(&atom.element);
    let implicit_hydrogens = best_valence(valences, bond_order_sum)
        .map(|valence| {
            let free = valence as i32 - bond_order_sum as i32 - atom.charge as i32;
            free.clamp(0, u8::MAX as i32) as u8
        })
        .unwrap_or(0);
    let valence_error = elements::max_valence(&atom.element)
        .is_some_and(|max| bond_order_sum > max as u32);

    DerivedChem {
        implicit_hydrogens,
        bond_order_sum,
        valence_error,
    }
}

/// Computes the implicit hydrogen count of one atom directly from the graph.
///
/// Returns `0` for atoms that do not exist or whose element has no valence model.
pub fn implicit_hydrogens(molecule: &Molecule, atom_id: AtomId) -> u8 {
    molecule
        .atom(atom_id)
        .map(|atom| derive(atom, molecule.bond_order_sum(atom_id)).implicit_hydrogens)
        .unwrap_or(0)
}

/// Checks whether a new bond of `new_order` fits within the atom's largest valence.
///
/// Elements without a valence model always accept new bonds.
pub fn can_add_bond(molecule: &Molecule, atom_id: AtomId, new_order: u8) -> bool {
    let Some(atom) = molecule.atom(atom_id) else {
        return false;
    };
    match elements::max_valence(&atom.element) {
        Some(max) => molecule.bond_order_sum(atom_id) + new_order as u32 <= max as u32,
        None => true,
    }
}

/// Owns the derived-chemistry side table for a molecule.
///
/// The table is keyed by atom ID and is the only place implicit hydrogens and valence
/// errors are stored. Callers refresh it after each edit, either in full or for just the
/// atoms the edit touched.
#[derive(Debug, Clone, Default)]
pub struct ValenceEngine {
    derived: SecondaryMap<AtomId, DerivedChem>,
}

impl ValenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes derived chemistry for every atom, discarding all previous entries.
    pub fn update_all(&mut self, molecule: &Molecule) {
        self.derived.clear();
        for (atom_id, atom) in molecule.atoms_iter() {
            self.derived
                .insert(atom_id, derive(atom, molecule.bond_order_sum(atom_id)));
        }
        trace!("Recomputed derived chemistry for {} atoms", self.derived.len());
    }

    /// Recomputes derived chemistry for the named atoms only.
    ///
    /// Entries for atoms that are no longer in the molecule are dropped.
    pub fn update_affected(
        &mut self,
        molecule: &Molecule,
        atom_ids: impl IntoIterator<Item = AtomId>,
    ) {
        for atom_id in atom_ids {
            match molecule.atom(atom_id) {
                Some(atom) => {
                    self.derived
                        .insert(atom_id, derive(atom, molecule.bond_order_sum(atom_id)));
                }
                None => {
                    self.derived.remove(atom_id);
                }
            }
        }
    }

    pub fn get(&self, atom_id: AtomId) -> Option<&DerivedChem> {
        self.derived.get(atom_id)
    }

    pub fn implicit_hydrogens(&self, atom_id: AtomId) -> u8 {
        self.derived
            .get(atom_id)
            .map_or(0, |derived| derived.implicit_hydrogens)
    }

    pub fn has_valence_error(&self, atom_id: AtomId) -> bool {
        self.derived
            .get(atom_id)
            .is_some_and(|derived| derived.valence_error)
    }

    pub fn len(&self) -> usize {
        self.derived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.derived.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// An advisory finding about one atom. Diagnostics never block editing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(skip)]
    pub atom_id: AtomId,
    pub severity: Severity,
    pub message: String,
}

/// Reports every atom whose bond-order sum exceeds its element's largest valence.
///
/// Under-saturated atoms (radicals, carbocations drawn without a charge) are not reported.
pub fn validate(molecule: &Molecule) -> Vec<Diagnostic> {
    molecule
        .atoms_iter()
        .filter_map(|(atom_id, atom)| {
            let max = elements::max_valence(&atom.element)?;
            let sum = molecule.bond_order_sum(atom_id);
            (sum > max as u32).then(|| Diagnostic {
                atom_id,
                severity: Severity::Error,
                message: format!(
                    "Exceeded valence on {}: bond order sum {} > {}",
                    atom.element, sum, max
                ),
            })
        })
        .collect()
}

/// Flags motifs associated with energetic or oxidizing compounds, purely as UI hints.
pub fn safety_scan(molecule: &Molecule) -> Vec<Diagnostic> {
    let mut warnings = Vec::new();

    for (atom_id, atom) in molecule.atoms_iter() {
        let neighbor_elements: Vec<&str> = molecule
            .neighbors(atom_id)
            .filter_map(|(_, other)| molecule.atom(other))
            .map(|other| other.element.as_str())
            .collect();
        let count = |symbol: &str| neighbor_elements.iter().filter(|&&e| e == symbol).count();

        match atom.element.as_str() {
            "N" if count("N") >= 2 => warnings.push(Diagnostic {
                atom_id,
                severity: Severity::Warning,
                message: "Azide-like N-N-N motif: potentially explosive".to_string(),
            }),
            "N" if count("O") >= 2 => warnings.push(Diagnostic {
                atom_id,
                severity: Severity::Warning,
                message: "Nitro-like N(O)O motif: energetic / oxidizing group".to_string(),
            }),
            _ => {}
        }
    }

    for (_, bond) in molecule.bonds_iter() {
        let is_oxygen = |id| molecule.atom(id).is_some_and(|a| a.element == "O");
        if is_oxygen(bond.atom1_id) && is_oxygen(bond.atom2_id) {
            warnings.push(Diagnostic {
                atom_id: bond.atom1_id,
                severity: Severity::Warning,
                message: "Peroxide O-O bond: strong oxidizer".to_string(),
            });
        }
    }

    warnings
}
