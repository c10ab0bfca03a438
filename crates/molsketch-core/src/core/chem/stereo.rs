use super::elements;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondKind;
use crate::core::utils::geometry::signed_area;
use nalgebra::{Point2, Vector2};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

const COLLINEAR_EPSILON: f64 = 1e-9;

/// CIP handedness of a stereocenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Chirality {
    R,
    S,
}

impl Chirality {
    pub fn flipped(self) -> Self {
        match self {
            Self::R => Self::S,
            Self::S => Self::R,
        }
    }
}

impl fmt::Display for Chirality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::R => write!(f, "R"),
            Self::S => write!(f, "S"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    TowardViewer,
    AwayFromViewer,
}

#[derive(Debug, Clone, Copy)]
struct Substituent {
    priority: u8,
    /// `None` for the implicit hydrogen synthesized on three-coordinate centers.
    direction: Option<Vector2<f64>>,
    kind: Option<BondKind>,
}

/// Derives R/S labels for every eligible stereocenter.
///
/// Atoms whose configuration cannot be determined from the drawing are absent from the
/// returned map; no label is ever guessed.
pub fn assign_stereo(molecule: &Molecule) -> HashMap<AtomId, Chirality> {
    molecule
        .atoms_iter()
        .filter_map(|(atom_id, _)| stereo_label(molecule, atom_id).map(|label| (atom_id, label)))
        .collect()
}

/// Derives the R/S label of a single atom.
///
/// An atom is considered only if it is carbon or nitrogen, has three or four bonds, and at
/// least one of them is a solid or hashed wedge. Priorities are first-sphere atomic numbers;
/// ties keep adjacency order.
pub fn stereo_label(molecule: &Molecule, atom_id: AtomId) -> Option<Chirality> {
    let center = molecule.atom(atom_id)?;
    if !matches!(center.element.as_str(), "C" | "N") {
        return None;
    }

    let bonds = molecule.connected_bonds(atom_id);
    if !(3..=4).contains(&bonds.len()) {
        return None;
    }
    if !bonds.iter().any(|(_, bond)| bond.kind.is_stereo_wedge()) {
        return None;
    }

    let mut substituents: Vec<Substituent> = bonds
        .iter()
        .filter_map(|(_, bond)| {
            let neighbor = molecule.atom(bond.other(atom_id)?)?;
            Some(Substituent {
                priority: elements::atomic_number(&neighbor.element),
                direction: Some(neighbor.position - center.position),
                kind: Some(bond.kind),
            })
        })
        .collect();

    if substituents.len() == 3 {
        substituents.push(Substituent {
            priority: 0,
            direction: None,
            kind: None,
        });
    }

    substituents.sort_by(|a, b| b.priority.cmp(&a.priority));

    let ranked: Vec<Point2<f64>> = substituents[..3]
        .iter()
        .map(|s| s.direction.map(Point2::from))
        .collect::<Option<_>>()?;
    let area = signed_area(&ranked);
    if area.abs() < COLLINEAR_EPSILON {
        return None;
    }
    let tentative = if area > 0.0 { Chirality::R } else { Chirality::S };

    let lowest = substituents[3];
    let depth = match lowest.kind {
        Some(BondKind::WedgeHash) => Depth::AwayFromViewer,
        Some(BondKind::WedgeSolid) => Depth::TowardViewer,
        Some(_) => return None,
        None => hidden_hydrogen_depth(&substituents[..3])?,
    };

    Some(match depth {
        Depth::AwayFromViewer => tentative,
        Depth::TowardViewer => tentative.flipped(),
    })
}

/// The implicit hydrogen sits opposite whichever wedge kind the drawn neighbors use.
fn hidden_hydrogen_depth(real: &[Substituent]) -> Option<Depth> {
    let has_solid = real.iter().any(|s| s.kind == Some(BondKind::WedgeSolid));
    let has_hash = real.iter().any(|s| s.kind == Some(BondKind::WedgeHash));
    match (has_solid, has_hash) {
        (true, false) => Some(Depth::AwayFromViewer),
        (false, true) => Some(Depth::TowardViewer),
        _ => None,
    }
}
