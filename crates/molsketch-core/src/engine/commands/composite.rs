use super::Command;
use crate::core::models::ids::AtomId;
use crate::engine::document::Document;

/// Runs several commands as a single undo step; undo walks them in reverse.
#[derive(Debug)]
pub struct CompositeCommand {
    label: String,
    commands: Vec<Box<dyn Command>>,
}

impl CompositeCommand {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            commands: Vec::new(),
        }
    }

    pub fn with(mut self, command: impl Command + 'static) -> Self {
        self.commands.push(Box::new(command));
        self
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for CompositeCommand {
    fn execute(&mut self, document: &mut Document) {
        for command in &mut self.commands {
            command.execute(document);
        }
    }

    fn undo(&mut self, document: &mut Document) {
        for command in self.commands.iter_mut().rev() {
            command.undo(document);
        }
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn affected_atoms(&self) -> Option<Vec<AtomId>> {
        let mut atoms = Vec::new();
        for command in &self.commands {
            atoms.extend(command.affected_atoms()?);
        }
        atoms.sort();
        atoms.dedup();
        Some(atoms)
    }
}
