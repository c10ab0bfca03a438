use super::Command;
use crate::core::models::ids::{AtomId, BondId};
use crate::core::models::topology::BondKind;
use crate::engine::document::Document;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Atom(AtomId),
    Bond(BondId),
}

/// A property together with its value. The variant names the property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Element(String),
    Charge(i8),
    ExplicitHydrogens(u8),
    Isotope(Option<u16>),
    Radicals(u8),
    /// Bond kind and order change together so the order always matches the drawn style.
    BondStyle { kind: BondKind, order: u8 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub entity: Entity,
    pub new_value: PropertyValue,
    /// Captured from the document on first execution.
    pub old_value: Option<PropertyValue>,
}

impl PropertyChange {
    pub fn new(entity: Entity, new_value: PropertyValue) -> Self {
        Self {
            entity,
            new_value,
            old_value: None,
        }
    }
}

/// Applies a batch of property edits as one atomic step.
#[derive(Debug, Default)]
pub struct ChangePropertyCommand {
    changes: Vec<PropertyChange>,
    affected: Vec<AtomId>,
}

impl ChangePropertyCommand {
    pub fn new(changes: Vec<PropertyChange>) -> Self {
        Self {
            changes,
            affected: Vec::new(),
        }
    }

    pub fn set_element(atom_id: AtomId, element: &str) -> Self {
        Self::new(vec![PropertyChange::new(
            Entity::Atom(atom_id),
            PropertyValue::Element(element.to_string()),
        )])
    }

    pub fn set_charge(atom_id: AtomId, charge: i8) -> Self {
        Self::new(vec![PropertyChange::new(
            Entity::Atom(atom_id),
            PropertyValue::Charge(charge),
        )])
    }

    /// Restyles a bond, resetting its order to the kind's nominal order.
    pub fn set_bond_kind(bond_id: BondId, kind: BondKind) -> Self {
        Self::new(vec![PropertyChange::new(
            Entity::Bond(bond_id),
            PropertyValue::BondStyle {
                kind,
                order: kind.nominal_order(),
            },
        )])
    }

    pub fn changes(&self) -> &[PropertyChange] {
        &self.changes
    }
}

/// Writes `value` into the entity and returns the value it replaced.
///
/// Returns `None` when the entity is gone or does not carry that property.
fn swap_value(document: &mut Document, entity: Entity, value: &PropertyValue) -> Option<PropertyValue> {
    match entity {
        Entity::Atom(id) => {
            let atom = document.molecule.atom_mut(id)?;
            Some(match value {
                PropertyValue::Element(element) => {
                    PropertyValue::Element(std::mem::replace(&mut atom.element, element.clone()))
                }
                PropertyValue::Charge(charge) => {
                    PropertyValue::Charge(std::mem::replace(&mut atom.charge, *charge))
                }
                PropertyValue::ExplicitHydrogens(count) => PropertyValue::ExplicitHydrogens(
                    std::mem::replace(&mut atom.explicit_hydrogens, *count),
                ),
                PropertyValue::Isotope(isotope) => {
                    PropertyValue::Isotope(std::mem::replace(&mut atom.isotope, *isotope))
                }
                PropertyValue::Radicals(radicals) => {
                    PropertyValue::Radicals(std::mem::replace(&mut atom.radicals, *radicals))
                }
                PropertyValue::BondStyle { .. } => return None,
            })
        }
        Entity::Bond(id) => {
            let bond = document.molecule.bond_mut(id)?;
            match value {
                PropertyValue::BondStyle { kind, order } => {
                    let old = PropertyValue::BondStyle {
                        kind: bond.kind,
                        order: bond.order,
                    };
                    bond.kind = *kind;
                    bond.order = *order;
                    Some(old)
                }
                _ => None,
            }
        }
    }
}

impl Command for ChangePropertyCommand {
    fn execute(&mut self, document: &mut Document) {
        self.affected.clear();
        for change in &mut self.changes {
            match swap_value(document, change.entity, &change.new_value) {
                Some(previous) => {
                    if change.old_value.is_none() {
                        change.old_value = Some(previous);
                    }
                }
                None => warn!(
                    "Property {:?} cannot be applied to {:?}",
                    change.new_value, change.entity
                ),
            }
            match change.entity {
                Entity::Atom(id) => self.affected.push(id),
                Entity::Bond(id) => {
                    if let Some(bond) = document.molecule.bond(id) {
                        self.affected.extend([bond.atom1_id, bond.atom2_id]);
                    }
                }
            }
        }
    }

    fn undo(&mut self, document: &mut Document) {
        for change in self.changes.iter().rev() {
            if let Some(old) = &change.old_value {
                swap_value(document, change.entity, old);
            }
        }
    }

    fn label(&self) -> &str {
        "Change properties"
    }

    fn affected_atoms(&self) -> Option<Vec<AtomId>> {
        Some(self.affected.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point2;

    fn setup() -> (Document, AtomId, AtomId, BondId) {
        let mut document = Document::new();
        let a = document.molecule.add_atom(Atom::new("C", Point2::origin()));
        let b = document.molecule.add_atom(Atom::new("C", Point2::new(40.0, 0.0)));
        let bond = document.molecule.add_bond(a, b, BondKind::Single).unwrap();
        (document, a, b, bond)
    }

    #[test]
    fn batch_is_applied_and_reverted_as_one_step() {
        let (mut document, a, b, bond) = setup();
        let mut command = ChangePropertyCommand::new(vec![
            PropertyChange::new(Entity::Atom(a), PropertyValue::Element("N".into())),
            PropertyChange::new(Entity::Atom(a), PropertyValue::Charge(1)),
            PropertyChange::new(
                Entity::Bond(bond),
                PropertyValue::BondStyle {
                    kind: BondKind::Double,
                    order: 2,
                },
            ),
        ]);

        command.execute(&mut document);
        let atom = document.molecule.atom(a).unwrap();
        assert_eq!((atom.element.as_str(), atom.charge), ("N", 1));
        assert_eq!(document.molecule.bond(bond).unwrap().order, 2);
        let affected = command.affected_atoms().unwrap();
        assert!(affected.contains(&a) && affected.contains(&b));

        command.undo(&mut document);
        let atom = document.molecule.atom(a).unwrap();
        assert_eq!((atom.element.as_str(), atom.charge), ("C", 0));
        let restored = document.molecule.bond(bond).unwrap();
        assert_eq!((restored.kind, restored.order), (BondKind::Single, 1));
    }

    #[test]
    fn old_values_are_captured_once_across_redo() {
        let (mut document, a, _, _) = setup();
        let mut command = ChangePropertyCommand::set_charge(a, -1);
        command.execute(&mut document);
        command.undo(&mut document);
        command.execute(&mut document);
        assert_eq!(command.changes()[0].old_value, Some(PropertyValue::Charge(0)));
        command.undo(&mut document);
        assert_eq!(document.molecule.atom(a).unwrap().charge, 0);
    }

    #[test]
    fn mismatched_property_is_skipped() {
        let (mut document, a, _, _) = setup();
        let mut command = ChangePropertyCommand::new(vec![PropertyChange::new(
            Entity::Atom(a),
            PropertyValue::BondStyle {
                kind: BondKind::Triple,
                order: 3,
            },
        )]);
        command.execute(&mut document);
        command.undo(&mut document);
        assert_eq!(document.molecule.atom(a).unwrap().element, "C");
        assert_eq!(command.changes()[0].old_value, None);
    }

    #[test]
    fn set_bond_kind_uses_nominal_order() {
        let (mut document, _, _, bond) = setup();
        let mut command = ChangePropertyCommand::set_bond_kind(bond, BondKind::Triple);
        command.execute(&mut document);
        assert_eq!(document.molecule.bond(bond).unwrap().order, 3);
        let mut element = ChangePropertyCommand::set_element(document.molecule.atom_ids()[0], "O");
        element.execute(&mut document);
        assert_eq!(document.molecule.atom(document.molecule.atom_ids()[0]).unwrap().element, "O");
    }
}
