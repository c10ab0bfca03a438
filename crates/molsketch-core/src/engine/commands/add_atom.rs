use super::Command;
use crate::core::models::atom::Atom;
use crate::core::models::ids::AtomId;
use crate::engine::document::Document;
use tracing::debug;

#[derive(Debug)]
pub struct AddAtomCommand {
    atom: Atom,
    created: Option<AtomId>,
}

impl AddAtomCommand {
    pub fn new(atom: Atom) -> Self {
        Self {
            atom,
            created: None,
        }
    }

    /// The id of the atom this command created, once executed.
    pub fn atom_id(&self) -> Option<AtomId> {
        self.created
    }
}

impl Command for AddAtomCommand {
    fn execute(&mut self, document: &mut Document) {
        match self.created {
            Some(id) => {
                document.molecule.restore_atom(id, self.atom.clone());
            }
            None => {
                let id = document.molecule.add_atom(self.atom.clone());
                debug!("Added {} atom {:?}", self.atom.element, id);
                self.created = Some(id);
            }
        }
    }

    fn undo(&mut self, document: &mut Document) {
        if let Some(id) = self.created {
            if let Some((atom, _)) = document.molecule.remove_atom(id) {
                self.atom = atom;
            }
        }
    }

    fn label(&self) -> &str {
        "Add atom"
    }

    fn affected_atoms(&self) -> Option<Vec<AtomId>> {
        Some(self.created.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn undo_removes_the_created_atom_and_redo_restores_its_id() {
        let mut document = Document::new();
        let mut command = AddAtomCommand::new(Atom::new("N", Point2::new(5.0, 5.0)));

        command.execute(&mut document);
        let id = command.atom_id().unwrap();
        assert_eq!(document.molecule.atom(id).unwrap().element, "N");

        command.undo(&mut document);
        assert!(document.molecule.is_empty());

        command.execute(&mut document);
        assert_eq!(command.atom_id(), Some(id));
        assert!(document.molecule.contains_atom(id));
        assert_eq!(command.affected_atoms(), Some(vec![id]));
    }
}
