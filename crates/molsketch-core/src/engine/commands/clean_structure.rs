use super::Command;
use crate::core::models::ids::AtomId;
use crate::engine::document::Document;
use nalgebra::Point2;
use std::collections::HashMap;

/// Commits a computed layout as one undoable step.
///
/// The target positions are fixed at construction, so redo re-applies exactly the same
/// layout instead of recomputing it. The positions before the first execution are
/// snapshotted and restored verbatim on undo.
#[derive(Debug)]
pub struct CleanStructureCommand {
    targets: HashMap<AtomId, Point2<f64>>,
    before: Option<HashMap<AtomId, Point2<f64>>>,
}

impl CleanStructureCommand {
    pub fn new(targets: HashMap<AtomId, Point2<f64>>) -> Self {
        Self {
            targets,
            before: None,
        }
    }

    pub fn targets(&self) -> &HashMap<AtomId, Point2<f64>> {
        &self.targets
    }
}

fn apply(document: &mut Document, positions: &HashMap<AtomId, Point2<f64>>) {
    for (&id, &position) in positions {
        if let Some(atom) = document.molecule.atom_mut(id) {
            atom.position = position;
        }
    }
}

impl Command for CleanStructureCommand {
    fn execute(&mut self, document: &mut Document) {
        if self.before.is_none() {
            self.before = Some(document.molecule.positions());
        }
        apply(document, &self.targets);
    }

    fn undo(&mut self, document: &mut Document) {
        if let Some(before) = &self.before {
            apply(document, before);
        }
    }

    fn label(&self) -> &str {
        "Clean structure"
    }

    fn affected_atoms(&self) -> Option<Vec<AtomId>> {
        Some(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;

    #[test]
    fn repeated_undo_redo_is_idempotent() {
        let mut document = Document::new();
        let a = document.molecule.add_atom(Atom::new("C", Point2::new(3.0, 4.0)));
        let b = document.molecule.add_atom(Atom::new("C", Point2::new(7.0, 4.0)));
        let targets = HashMap::from([(a, Point2::new(0.0, 0.0)), (b, Point2::new(40.0, 0.0))]);

        let mut command = CleanStructureCommand::new(targets.clone());
        for _ in 0..3 {
            command.execute(&mut document);
            assert_eq!(document.molecule.positions(), targets);
            command.undo(&mut document);
            assert_eq!(document.molecule.atom(a).unwrap().position, Point2::new(3.0, 4.0));
            assert_eq!(document.molecule.atom(b).unwrap().position, Point2::new(7.0, 4.0));
        }
    }
}
