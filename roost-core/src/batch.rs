//! Accumulate-then-commit edits to todo completion and read state.
//!
//! One [`TodoBatch`] is built per commit cycle and handed to the commit
//! call; there is no shared pending list. Later edits to the same todo
//! replace earlier ones.

use std::collections::BTreeMap;

use roost_types::{FieldChange, ItemId, PositionField, WriteBatch};

/// Pending completion and read edits for a set of todos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoBatch {
    completed: BTreeMap<ItemId, bool>,
    read: BTreeMap<ItemId, bool>,
}

impl TodoBatch {
    /// Start an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a todo complete or incomplete.
    pub fn mark_complete(&mut self, id: ItemId, complete: bool) -> &mut Self {
        self.completed.insert(id, complete);
        self
    }

    /// Mark a todo read or unread.
    pub fn mark_read(&mut self, id: ItemId, read: bool) -> &mut Self {
        self.read.insert(id, read);
        self
    }

    /// Every todo touched by this batch.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        let mut ids: Vec<ItemId> = self.completed.keys().chain(self.read.keys()).copied().collect();
        ids.sort();
        ids.dedup();
        ids.into_iter()
    }

    /// Todos being moved back to the incomplete list.
    pub fn reopened(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.completed
            .iter()
            .filter(|(_, complete)| !**complete)
            .map(|(id, _)| *id)
    }

    /// Whether nothing has been queued.
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.read.is_empty()
    }

    /// Turn the edits into field writes.
    ///
    /// Completing a todo stamps `completed_at = now` and puts it at the top
    /// of the complete list (`-now`, newest first). Reopening clears both
    /// and asks `reopen_position` for a fresh slot in the incomplete list;
    /// `None` means the todo is already open and it is left untouched.
    pub fn into_writes(
        self,
        now: f64,
        mut reopen_position: impl FnMut(ItemId) -> Option<f64>,
    ) -> WriteBatch {
        let mut batch = WriteBatch::new();
        for (id, complete) in self.completed {
            if complete {
                batch
                    .update(id, FieldChange::CompletedAt(now))
                    .update(id, FieldChange::Position(PositionField::CompletedPosition, -now));
            } else if let Some(position) = reopen_position(id) {
                batch
                    .update(id, FieldChange::CompletedAt(0.0))
                    .update(id, FieldChange::Position(PositionField::CompletedPosition, 0.0))
                    .update(id, FieldChange::Position(PositionField::Position, position));
            }
        }
        for (id, read) in self.read {
            batch.update(id, FieldChange::Read(read));
        }
        batch
    }
}
