use super::Command;
use crate::core::models::atom::Atom;
use crate::core::models::ids::{AnnotationId, AtomId, BondId};
use crate::core::models::topology::Bond;
use crate::engine::annotations::Annotation;
use crate::engine::document::Document;
use tracing::debug;

/// Deletes atoms (with their bonds) and standalone bonds.
///
/// Badges pinned to a removed atom go with it. Undo re-inserts everything under the
/// original ids.
#[derive(Debug, Default)]
pub struct RemoveElementsCommand {
    atoms: Vec<AtomId>,
    bonds: Vec<BondId>,
    removed_atoms: Vec<(AtomId, Atom)>,
    removed_bonds: Vec<(BondId, Bond)>,
    removed_annotations: Vec<(AnnotationId, Annotation)>,
}

impl RemoveElementsCommand {
    pub fn new(atoms: Vec<AtomId>, bonds: Vec<BondId>) -> Self {
        Self {
            atoms,
            bonds,
            ..Self::default()
        }
    }

    pub fn atoms(atoms: Vec<AtomId>) -> Self {
        Self::new(atoms, Vec::new())
    }

    pub fn bonds(bonds: Vec<BondId>) -> Self {
        Self::new(Vec::new(), bonds)
    }
}

impl Command for RemoveElementsCommand {
    fn execute(&mut self, document: &mut Document) {
        self.removed_atoms.clear();
        self.removed_bonds.clear();
        self.removed_annotations.clear();

        for &bond_id in &self.bonds {
            if let Some(bond) = document.molecule.remove_bond(bond_id) {
                self.removed_bonds.push((bond_id, bond));
            }
        }
        for &atom_id in &self.atoms {
            let badge_ids: Vec<AnnotationId> = document
                .annotations
                .badges_for(atom_id)
                .into_iter()
                .map(|(id, _)| id)
                .collect();
            for id in badge_ids {
                if let Some(annotation) = document.annotations.remove(id) {
                    self.removed_annotations.push((id, annotation));
                }
            }
            if let Some((atom, bonds)) = document.molecule.remove_atom(atom_id) {
                self.removed_atoms.push((atom_id, atom));
                self.removed_bonds.extend(bonds);
            }
        }
        debug!(
            "Removed {} atom(s) and {} bond(s)",
            self.removed_atoms.len(),
            self.removed_bonds.len()
        );
    }

    fn undo(&mut self, document: &mut Document) {
        for (id, atom) in self.removed_atoms.iter().rev() {
            document.molecule.restore_atom(*id, atom.clone());
        }
        for (id, bond) in self.removed_bonds.iter().rev() {
            document.molecule.restore_bond(*id, *bond);
        }
        for (id, annotation) in self.removed_annotations.iter().rev() {
            document.annotations.restore(*id, annotation.clone());
        }
    }

    fn label(&self) -> &str {
        "Delete"
    }

    fn affected_atoms(&self) -> Option<Vec<AtomId>> {
        let mut atoms: Vec<AtomId> = self.atoms.clone();
        for (_, bond) in &self.removed_bonds {
            atoms.push(bond.atom1_id);
            atoms.push(bond.atom2_id);
        }
        atoms.sort();
        atoms.dedup();
        Some(atoms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::BondKind;
    use crate::engine::annotations::Badge;
    use nalgebra::{Point2, Vector2};

    #[test]
    fn removing_an_atom_cascades_and_undo_restores_identities() {
        let mut document = Document::new();
        let m = &mut document.molecule;
        let a = m.add_atom(Atom::new("C", Point2::origin()));
        let b = m.add_atom(Atom::new("C", Point2::new(40.0, 0.0)));
        let c = m.add_atom(Atom::new("O", Point2::new(80.0, 0.0)));
        let ab = m.add_bond(a, b, BondKind::Single).unwrap();
        let bc = m.add_bond(b, c, BondKind::Double).unwrap();
        let badge = document.annotations.add(Annotation::Badge(Badge {
            atom_id: b,
            text: "+".into(),
            offset: Vector2::zeros(),
        }));

        let mut command = RemoveElementsCommand::atoms(vec![b]);
        command.execute(&mut document);
        assert_eq!(document.molecule.atom_count(), 2);
        assert_eq!(document.molecule.bond_count(), 0);
        assert_eq!(document.molecule.degree(a), 0);
        assert!(document.annotations.is_empty());

        command.undo(&mut document);
        assert!(document.molecule.contains_atom(b));
        assert_eq!(document.molecule.bond_between(a, b), Some(ab));
        assert_eq!(document.molecule.bond_between(b, c), Some(bc));
        assert_eq!(document.molecule.bond(bc).unwrap().order, 2);
        assert!(document.annotations.get(badge).is_some());

        let affected = command.affected_atoms().unwrap();
        assert!(affected.contains(&a) && affected.contains(&b) && affected.contains(&c));
    }

    #[test]
    fn removing_a_bond_keeps_its_atoms() {
        let mut document = Document::new();
        let a = document.molecule.add_atom(Atom::new("C", Point2::origin()));
        let b = document.molecule.add_atom(Atom::new("N", Point2::new(40.0, 0.0)));
        let bond = document.molecule.add_bond(a, b, BondKind::Triple).unwrap();

        let mut command = RemoveElementsCommand::bonds(vec![bond]);
        command.execute(&mut document);
        assert_eq!(document.molecule.atom_count(), 2);
        assert!(!document.molecule.contains_bond(bond));

        command.undo(&mut document);
        assert!(document.molecule.contains_bond(bond));

        // Redo then undo again behaves the same.
        command.execute(&mut document);
        command.undo(&mut document);
        assert_eq!(document.molecule.bond_between(a, b), Some(bond));
    }
}
