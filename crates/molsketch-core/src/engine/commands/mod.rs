//! # Commands
//!
//! A command is the only sanctioned way to change a [`Document`]. `execute` applies the
//! effect and must be callable again for redo; `undo` restores the prior state using the
//! identities the command recorded, so ids held elsewhere (selections, badges) stay valid.

use super::document::Document;
use crate::core::models::ids::AtomId;
use std::fmt;

pub mod add_atom;
pub mod add_bond;
pub mod add_template;
pub mod change_property;
pub mod clean_structure;
pub mod composite;
pub mod cut_bonds;
pub mod move_elements;
pub mod remove_elements;

pub use add_atom::AddAtomCommand;
pub use add_bond::AddBondCommand;
pub use add_template::{AddRingCommand, AddTemplateCommand, RingPlacement, Template, TemplateBond};
pub use change_property::{ChangePropertyCommand, Entity, PropertyChange, PropertyValue};
pub use clean_structure::CleanStructureCommand;
pub use composite::CompositeCommand;
pub use cut_bonds::{Cleavage, CutBondsCommand};
pub use move_elements::MoveElementsCommand;
pub use remove_elements::RemoveElementsCommand;

pub trait Command: fmt::Debug {
    fn execute(&mut self, document: &mut Document);

    fn undo(&mut self, document: &mut Document);

    /// Short human-readable name for undo/redo menus.
    fn label(&self) -> &str;

    /// Atoms whose derived chemistry must be refreshed after `execute` or `undo`.
    ///
    /// `None` asks for a full refresh. An empty list means the edit cannot change valence.
    fn affected_atoms(&self) -> Option<Vec<AtomId>>;
}
