use super::commands::Command;
use super::config::DEFAULT_HISTORY_CAPACITY;
use super::document::Document;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Linear undo/redo history with a bounded undo stack.
///
/// Executing a new command discards everything that could have been redone; there is no
/// branching history. Once the undo stack exceeds its capacity the oldest entry is dropped.
#[derive(Debug)]
pub struct CommandManager {
    history: VecDeque<Box<dyn Command>>,
    future: Vec<Box<dyn Command>>,
    capacity: usize,
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl CommandManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            future: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn execute(&mut self, mut command: Box<dyn Command>, document: &mut Document) {
        command.execute(document);
        trace!("Executed '{}'", command.label());
        self.history.push_back(command);
        if self.history.len() > self.capacity {
            if let Some(dropped) = self.history.pop_front() {
                debug!("History full, dropping '{}'", dropped.label());
            }
        }
        self.future.clear();
    }

    /// Reverts the most recent command. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self, document: &mut Document) -> bool {
        let Some(mut command) = self.history.pop_back() else {
            return false;
        };
        command.undo(document);
        trace!("Undid '{}'", command.label());
        self.future.push(command);
        true
    }

    /// Re-applies the most recently undone command. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self, document: &mut Document) -> bool {
        let Some(mut command) = self.future.pop() else {
            return false;
        };
        command.execute(document);
        trace!("Redid '{}'", command.label());
        self.history.push_back(command);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.history.len()
    }

    pub fn redo_len(&self) -> usize {
        self.future.len()
    }

    /// The command `undo` would revert next.
    pub fn peek_undo(&self) -> Option<&dyn Command> {
        self.history.back().map(|c| c.as_ref())
    }

    /// The command `redo` would re-apply next.
    pub fn peek_redo(&self) -> Option<&dyn Command> {
        self.future.last().map(|c| c.as_ref())
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.peek_undo().map(|c| c.label())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.peek_redo().map(|c| c.label())
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.future.clear();
    }
}
