//! Non-canonical SMILES generation.
//!
//! Each connected component is traversed depth-first from its first atom in store order.
//! Branches are parenthesized except for the last one, which continues the chain inline.
//! Bonds leading back to an already-visited atom become ring closures.

use crate::core::chem::{elements, valence};
use crate::core::models::atom::Atom;
use crate::core::models::ids::{AtomId, BondId};
use crate::core::models::molecule::Molecule;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Write;

/// Spanning-tree decomposition of one component.
#[derive(Default)]
struct Traversal {
    children: HashMap<AtomId, Vec<(BondId, AtomId)>>,
    closures: HashMap<AtomId, Vec<BondId>>,
}

struct Frame {
    atom: AtomId,
    parent_bond: Option<BondId>,
    next: usize,
}

enum Step {
    Atom { atom: AtomId, via: Option<BondId> },
    Text(&'static str),
}

/// Generates a SMILES string for `molecule`.
///
/// Disconnected components are joined with `.`; an empty molecule yields an empty string.
pub fn to_smiles(molecule: &Molecule) -> String {
    let mut visited: HashSet<AtomId> = HashSet::new();
    let mut components = Vec::new();

    for root in molecule.atom_ids() {
        if visited.contains(&root) {
            continue;
        }
        let traversal = traverse(molecule, root, &mut visited);
        components.push(emit(molecule, root, &traversal));
    }

    components.join(".")
}

fn traverse(molecule: &Molecule, root: AtomId, visited: &mut HashSet<AtomId>) -> Traversal {
    let mut traversal = Traversal::default();
    let mut seen_closures: HashSet<BondId> = HashSet::new();
    let mut stack = vec![Frame {
        atom: root,
        parent_bond: None,
        next: 0,
    }];
    visited.insert(root);

    while let Some(frame) = stack.last_mut() {
        let atom = frame.atom;
        let Some(&bond_id) = molecule.bond_ids_of(atom).get(frame.next) else {
            stack.pop();
            continue;
        };
        frame.next += 1;
        if frame.parent_bond == Some(bond_id) {
            continue;
        }
        let Some(other) = molecule.bond(bond_id).and_then(|b| b.other(atom)) else {
            continue;
        };

        if visited.insert(other) {
            traversal
                .children
                .entry(atom)
                .or_default()
                .push((bond_id, other));
            stack.push(Frame {
                atom: other,
                parent_bond: Some(bond_id),
                next: 0,
            });
        } else if seen_closures.insert(bond_id) {
            traversal.closures.entry(atom).or_default().push(bond_id);
            traversal.closures.entry(other).or_default().push(bond_id);
        }
    }

    traversal
}

fn emit(molecule: &Molecule, root: AtomId, traversal: &Traversal) -> String {
    let mut out = String::new();
    let mut in_use: BTreeSet<u32> = BTreeSet::new();
    let mut open: HashMap<BondId, u32> = HashMap::new();
    let mut steps = vec![Step::Atom {
        atom: root,
        via: None,
    }];

    while let Some(step) = steps.pop() {
        let (atom_id, via) = match step {
            Step::Text(text) => {
                out.push_str(text);
                continue;
            }
            Step::Atom { atom, via } => (atom, via),
        };

        if let Some(bond_id) = via {
            out.push_str(bond_symbol(molecule, bond_id));
        }
        if let Some(atom) = molecule.atom(atom_id) {
            out.push_str(&atom_token(molecule, atom_id, atom));
        }

        for &bond_id in traversal.closures.get(&atom_id).into_iter().flatten() {
            let number = match open.remove(&bond_id) {
                Some(number) => {
                    in_use.remove(&number);
                    number
                }
                None => {
                    let number = (1..).find(|n| !in_use.contains(n)).unwrap_or(1);
                    in_use.insert(number);
                    open.insert(bond_id, number);
                    number
                }
            };
            out.push_str(bond_symbol(molecule, bond_id));
            push_ring_number(&mut out, number);
        }

        let children = traversal.children.get(&atom_id).map_or(&[][..], Vec::as_slice);
        if let Some((&(last_bond, last_atom), branches)) = children.split_last() {
            steps.push(Step::Atom {
                atom: last_atom,
                via: Some(last_bond),
            });
            for &(bond_id, child) in branches.iter().rev() {
                steps.push(Step::Text(")"));
                steps.push(Step::Atom {
                    atom: child,
                    via: Some(bond_id),
                });
                steps.push(Step::Text("("));
            }
        }
    }

    out
}

fn bond_symbol(molecule: &Molecule, bond_id: BondId) -> &'static str {
    match molecule.bond(bond_id).map(|b| b.order) {
        Some(2) => "=",
        Some(3) => "#",
        Some(4) => "$",
        _ => "",
    }
}

fn push_ring_number(out: &mut String, number: u32) {
    if number < 10 {
        let _ = write!(out, "{}", number);
    } else {
        let _ = write!(out, "%{}", number);
    }
}

fn atom_token(molecule: &Molecule, atom_id: AtomId, atom: &Atom) -> String {
    let symbol = if elements::is_known_element(&atom.element) {
        atom.element.as_str()
    } else {
        "*"
    };

    let plain = atom.charge == 0 && atom.isotope.is_none() && atom.radicals == 0;
    if plain && (symbol == "*" || elements::is_organic_subset(symbol)) {
        return symbol.to_string();
    }

    let mut token = String::from("[");
    if let Some(isotope) = atom.isotope {
        let _ = write!(token, "{}", isotope);
    }
    token.push_str(symbol);

    let hydrogens =
        u32::from(valence::implicit_hydrogens(molecule, atom_id)) + u32::from(atom.explicit_hydrogens);
    match hydrogens {
        0 => {}
        1 => token.push('H'),
        n => {
            let _ = write!(token, "H{}", n);
        }
    }

    match atom.charge {
        0 => {}
        1 => token.push('+'),
        -1 => token.push('-'),
        c if c > 0 => {
            let _ = write!(token, "+{}", c);
        }
        c => {
            let _ = write!(token, "-{}", c.unsigned_abs());
        }
    }
    token.push(']');
    token
}
