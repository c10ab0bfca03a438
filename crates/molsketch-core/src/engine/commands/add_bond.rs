use super::Command;
use crate::core::models::ids::{AtomId, BondId};
use crate::core::models::topology::{Bond, BondKind};
use crate::engine::document::Document;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct AddBondCommand {
    bond: Bond,
    created: Option<BondId>,
}

impl AddBondCommand {
    pub fn new(atom1_id: AtomId, atom2_id: AtomId, kind: BondKind) -> Self {
        Self {
            bond: Bond::new(atom1_id, atom2_id, kind),
            created: None,
        }
    }

    pub fn bond_id(&self) -> Option<BondId> {
        self.created
    }
}

impl Command for AddBondCommand {
    fn execute(&mut self, document: &mut Document) {
        match self.created {
            Some(id) => {
                document.molecule.restore_bond(id, self.bond);
            }
            None => match document.molecule.insert_bond(self.bond) {
                Some(id) => {
                    debug!("Added {} bond {:?}", self.bond.kind, id);
                    self.created = Some(id);
                }
                None => warn!("Add bond had no effect"),
            },
        }
    }

    fn undo(&mut self, document: &mut Document) {
        if let Some(id) = self.created {
            if let Some(bond) = document.molecule.remove_bond(id) {
                self.bond = bond;
            }
        }
    }

    fn label(&self) -> &str {
        "Add bond"
    }

    fn affected_atoms(&self) -> Option<Vec<AtomId>> {
        Some(vec![self.bond.atom1_id, self.bond.atom2_id])
    }
}
