//! Batched mutations handed to the storage collaborator.
//!
//! A [`WriteBatch`] is applied atomically: either every op takes effect or
//! none does.

use serde::{Deserialize, Serialize};

use crate::ids::ItemId;
use crate::list::PositionField;
use crate::record::Record;

/// A single mutable field and its new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldChange {
    /// One of the position columns.
    Position(PositionField, f64),
    /// Todo completion time (`0.0` clears it).
    CompletedAt(f64),
    /// Todo read flag.
    Read(bool),
    /// Todo soft-delete flag.
    Deleted(bool),
    /// Todo or message body.
    Body(String),
    /// Topic label.
    Label(String),
    /// Topic pinned flag.
    Pinned(bool),
    /// Topic last-read time.
    MessageLastRead(f64),
    /// Topic show-completed flag.
    ShowCompleted(bool),
    /// Reaction active flag.
    Active(bool),
}

/// `(item, field, value)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWrite {
    /// Row to update.
    pub id: ItemId,
    /// Field and value.
    pub change: FieldChange,
}

/// A position assignment computed by the reorder algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionWrite {
    /// Member to move.
    pub id: ItemId,
    /// Its new position.
    pub position: f64,
}

impl PositionWrite {
    /// Express this as a write against a concrete position column.
    pub fn into_field_write(self, field: PositionField) -> FieldWrite {
        FieldWrite {
            id: self.id,
            change: FieldChange::Position(field, self.position),
        }
    }
}

/// One operation in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WriteOp {
    /// Insert a new row.
    Insert(Record),
    /// Update a field of an existing row.
    Update(FieldWrite),
}

/// An ordered, atomically applied set of writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an insert.
    pub fn insert(&mut self, record: Record) -> &mut Self {
        self.ops.push(WriteOp::Insert(record));
        self
    }

    /// Queue a field update.
    pub fn update(&mut self, id: ItemId, change: FieldChange) -> &mut Self {
        self.ops.push(WriteOp::Update(FieldWrite { id, change }));
        self
    }

    /// Queue an already built field write.
    pub fn push(&mut self, write: FieldWrite) -> &mut Self {
        self.ops.push(WriteOp::Update(write));
        self
    }

    /// The queued ops, in order.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Consume the batch, returning its ops.
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    /// Number of queued ops.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Extend<FieldWrite> for WriteBatch {
    fn extend<I: IntoIterator<Item = FieldWrite>>(&mut self, iter: I) {
        self.ops.extend(iter.into_iter().map(WriteOp::Update));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_preserves_order() {
        let a = ItemId::new();
        let b = ItemId::new();
        let mut batch = WriteBatch::new();
        batch
            .update(a, FieldChange::Read(true))
            .update(b, FieldChange::Deleted(true));

        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.ops()[0],
            WriteOp::Update(FieldWrite {
                id: a,
                change: FieldChange::Read(true)
            })
        );
    }

    #[test]
    fn position_write_targets_given_field() {
        let id = ItemId::new();
        let write = PositionWrite { id, position: 1.5 }.into_field_write(PositionField::PinPosition);
        assert_eq!(
            write.change,
            FieldChange::Position(PositionField::PinPosition, 1.5)
        );
    }

    #[test]
    fn extend_appends_updates() {
        let mut batch = WriteBatch::new();
        batch.extend(vec![
            PositionWrite {
                id: ItemId::new(),
                position: 0.0,
            }
            .into_field_write(PositionField::Position),
        ]);
        assert!(!batch.is_empty());
        assert!(matches!(batch.ops()[0], WriteOp::Update(_)));
    }
}
