//! Undo/redo history over document snapshots.
//!
//! Each entry is a serialized value plus the selection (as global offsets)
//! that was active when the snapshot was taken. Snapshots are cheap at blog
//! scale and make restoration exact by construction.

/// One history entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub markup: String,
    /// Selection as ordered global offsets, if one was active.
    pub selection: Option<(usize, usize)>,
}

/// Bounded undo/redo stacks.
#[derive(Debug)]
pub struct History {
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
    max_steps: usize,
}

const DEFAULT_MAX_STEPS: usize = 100;

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_max_steps(DEFAULT_MAX_STEPS)
    }

    pub fn with_max_steps(max_steps: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_steps,
        }
    }

    /// Record the pre-edit state. Any redo branch is invalidated, and the
    /// oldest entry is evicted past `max_steps`.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.redo.clear();
        self.undo.push(snapshot);
        if self.undo.len() > self.max_steps {
            self.undo.remove(0);
        }
    }

    /// Pop the most recent undo entry, exchanging it for the current state
    /// which moves to the redo stack.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let snapshot = self.undo.pop()?;
        self.redo.push(current);
        Some(snapshot)
    }

    /// Inverse of [`undo`](History::undo).
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let snapshot = self.redo.pop()?;
        self.undo.push(current);
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
