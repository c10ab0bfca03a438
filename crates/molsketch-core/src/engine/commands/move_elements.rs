use super::Command;
use crate::core::models::ids::AtomId;
use crate::engine::document::Document;
use nalgebra::Vector2;

/// Translates a set of atoms by a fixed vector; undo subtracts it again.
#[derive(Debug)]
pub struct MoveElementsCommand {
    atoms: Vec<AtomId>,
    delta: Vector2<f64>,
}

impl MoveElementsCommand {
    pub fn new(atoms: Vec<AtomId>, delta: Vector2<f64>) -> Self {
        Self { atoms, delta }
    }

    fn shift(&self, document: &mut Document, delta: Vector2<f64>) {
        for &id in &self.atoms {
            if let Some(atom) = document.molecule.atom_mut(id) {
                atom.position += delta;
            }
        }
    }
}

impl Command for MoveElementsCommand {
    fn execute(&mut self, document: &mut Document) {
        self.shift(document, self.delta);
    }

    fn undo(&mut self, document: &mut Document) {
        self.shift(document, -self.delta);
    }

    fn label(&self) -> &str {
        "Move"
    }

    fn affected_atoms(&self) -> Option<Vec<AtomId>> {
        Some(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point2;

    #[test]
    fn move_and_undo_are_symmetric() {
        let mut document = Document::new();
        let a = document.molecule.add_atom(Atom::new("C", Point2::new(1.0, 2.0)));
        let b = document.molecule.add_atom(Atom::new("C", Point2::new(9.0, 9.0)));

        let mut command = MoveElementsCommand::new(vec![a], Vector2::new(10.0, -5.0));
        command.execute(&mut document);
        assert_eq!(document.molecule.atom(a).unwrap().position, Point2::new(11.0, -3.0));
        assert_eq!(document.molecule.atom(b).unwrap().position, Point2::new(9.0, 9.0));

        command.undo(&mut document);
        assert_eq!(document.molecule.atom(a).unwrap().position, Point2::new(1.0, 2.0));
    }
}
