//! In-memory store.
//!
//! The reference [`Store`]: rows live in insertion order behind a shared
//! lock, writes are applied to a copy and swapped in so a batch lands
//! whole or not at all. Failure injection mirrors what a real backend can
//! do to callers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

use roost_types::{
    now, ChangeSet, EntityKind, FieldChange, FieldWrite, Group, GroupId, ItemId, ListSelector,
    Message, PositionField, Reaction, Record, RowChange, SearchHit, SearchHitKind, SearchScope,
    Topic, TopicCounts, WriteBatch, WriteOp,
};

use super::snippet;
use super::{Store, StoreError};

/// In-memory storage backend.
///
/// Clones share the same rows.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    groups: Vec<Group>,
    rows: Vec<Record>,
    index: HashMap<ItemId, usize>,
    subscribers: Vec<(Vec<EntityKind>, mpsc::UnboundedSender<ChangeSet>)>,
    committed: usize,
    fail_next_read: Option<String>,
    fail_next_write: Option<String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cause the next read to fail with the given error.
    pub fn fail_next_read(&self, error: &str) {
        self.lock().fail_next_read = Some(error.to_string());
    }

    /// Cause the next write to fail with the given error.
    pub fn fail_next_write(&self, error: &str) {
        self.lock().fail_next_write = Some(error.to_string());
    }

    /// Number of batches committed so far.
    pub fn committed_batches(&self) -> usize {
        self.lock().committed
    }

    /// Number of rows, groups excluded.
    pub fn row_count(&self) -> usize {
        self.lock().rows.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock for a read, consuming an injected read failure.
    fn read(&self) -> Result<MutexGuard<'_, MemoryStoreInner>, StoreError> {
        let mut inner = self.lock();
        match inner.fail_next_read.take() {
            Some(error) => Err(StoreError::Unavailable(error)),
            None => Ok(inner),
        }
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl MemoryStoreInner {
    fn get(&self, id: ItemId) -> Option<&Record> {
        self.index.get(&id).map(|&i| &self.rows[i])
    }

    fn topic_label(&self, id: ItemId) -> String {
        match self.get(id) {
            Some(Record::Topic(topic)) => topic.label.clone(),
            _ => String::new(),
        }
    }

    /// Rows that take part in text search, with their topic.
    fn searchable(
        &self,
        group: GroupId,
    ) -> impl Iterator<Item = (ItemId, ItemId, SearchHitKind, &str)> {
        self.rows.iter().filter_map(move |row| match row {
            Record::Todo(t) if t.group_id == group && !t.deleted => {
                Some((t.id, t.topic_id, SearchHitKind::Todo, t.body.as_str()))
            }
            Record::Message(m) if m.group_id == group => {
                Some((m.id, m.topic_id, SearchHitKind::Message, m.body.as_str()))
            }
            _ => None,
        })
    }

    /// Matching rows ranked by match count, ties in insertion order.
    fn ranked(&self, scope: &SearchScope) -> Vec<(ItemId, ItemId, SearchHitKind, &str)> {
        let terms = snippet::terms(&scope.term);
        let mut hits: Vec<(usize, (ItemId, ItemId, SearchHitKind, &str))> = self
            .searchable(scope.group_id)
            .map(|row| (snippet::match_count(row.3, &terms), row))
            .filter(|(rank, _)| *rank > 0)
            .collect();
        hits.sort_by(|a, b| b.0.cmp(&a.0));
        hits.into_iter().map(|(_, row)| row).collect()
    }

    fn notify(&mut self, changes: &[RowChange]) {
        self.subscribers.retain(|(kinds, tx)| {
            let wanted: Vec<RowChange> = changes
                .iter()
                .filter(|change| kinds.contains(&change.kind))
                .copied()
                .collect();
            if wanted.is_empty() {
                return !tx.is_closed();
            }
            tx.send(ChangeSet { changes: wanted }).is_ok()
        });
    }
}

fn apply(record: &mut Record, change: &FieldChange, at: f64) -> Result<(), StoreError> {
    match (&mut *record, change) {
        (Record::Topic(t), FieldChange::Position(PositionField::Position, p)) => t.position = *p,
        (Record::Topic(t), FieldChange::Position(PositionField::PinPosition, p)) => {
            t.pin_position = *p
        }
        (Record::Topic(t), FieldChange::Label(label)) => t.label = label.clone(),
        (Record::Topic(t), FieldChange::Pinned(pinned)) => t.pinned = *pinned,
        (Record::Topic(t), FieldChange::MessageLastRead(time)) => t.message_last_read = *time,
        (Record::Topic(t), FieldChange::ShowCompleted(show)) => t.show_completed = *show,
        (Record::Todo(t), FieldChange::Position(PositionField::Position, p)) => t.position = *p,
        (Record::Todo(t), FieldChange::Position(PositionField::CompletedPosition, p)) => {
            t.completed_position = *p
        }
        (Record::Todo(t), FieldChange::CompletedAt(time)) => t.completed_at = *time,
        (Record::Todo(t), FieldChange::Read(read)) => t.read = *read,
        (Record::Todo(t), FieldChange::Deleted(deleted)) => t.deleted = *deleted,
        (Record::Todo(t), FieldChange::Body(body)) => t.body = body.clone(),
        (Record::Message(m), FieldChange::Body(body)) => m.body = body.clone(),
        (Record::Reaction(r), FieldChange::Active(active)) => r.active = *active,
        (record, change) => {
            return Err(StoreError::Rejected(format!(
                "{:?} does not apply to a {}",
                change,
                record.kind()
            )))
        }
    }
    match record {
        Record::Topic(t) => t.modified_at = at,
        Record::Todo(t) => t.modified_at = at,
        Record::Message(m) => m.modified_at = at,
        Record::Reaction(r) => r.modified_at = at,
        Record::Group(_) => {}
    }
    Ok(())
}

fn note(changes: &mut Vec<RowChange>, change: RowChange) {
    if !changes.iter().any(|c| c.id == change.id) {
        changes.push(change);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_records(&self, list: &ListSelector) -> Result<Vec<Record>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .rows
            .iter()
            .filter(|row| row.position_in(list).is_some())
            .cloned()
            .collect())
    }

    async fn write(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(error) = inner.fail_next_write.take() {
            tracing::warn!("Injected write failure: {}", error);
            return Err(StoreError::Unavailable(error));
        }

        let at = now();
        let mut groups = inner.groups.clone();
        let mut rows = inner.rows.clone();
        let mut index = inner.index.clone();
        let mut changes = Vec::new();

        for op in batch.into_ops() {
            match op {
                WriteOp::Insert(Record::Group(group)) => {
                    if groups.iter().any(|g| g.id == group.id) {
                        return Err(StoreError::Rejected(format!("duplicate group {}", group.id)));
                    }
                    groups.push(group);
                }
                WriteOp::Insert(record) => {
                    let Some(id) = record.item_id() else {
                        continue;
                    };
                    if index.contains_key(&id) {
                        return Err(StoreError::Rejected(format!("duplicate row {}", id)));
                    }
                    note(
                        &mut changes,
                        RowChange {
                            kind: record.kind(),
                            group_id: record.group_id(),
                            id,
                        },
                    );
                    index.insert(id, rows.len());
                    rows.push(record);
                }
                WriteOp::Update(FieldWrite { id, change }) => {
                    let Some(&i) = index.get(&id) else {
                        return Err(StoreError::Rejected(format!("unknown row {}", id)));
                    };
                    let record = &mut rows[i];
                    apply(record, &change, at)?;
                    note(
                        &mut changes,
                        RowChange {
                            kind: record.kind(),
                            group_id: record.group_id(),
                            id,
                        },
                    );
                }
            }
        }

        inner.groups = groups;
        inner.rows = rows;
        inner.index = index;
        inner.committed += 1;
        inner.notify(&changes);
        Ok(())
    }

    async fn record(&self, id: ItemId) -> Result<Option<Record>, StoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn group(&self, id: GroupId) -> Result<Option<Group>, StoreError> {
        Ok(self.read()?.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn groups(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self.read()?.groups.clone())
    }

    async fn topic_counts(&self, topic: &Topic) -> Result<TopicCounts, StoreError> {
        let inner = self.read()?;
        let mut counts = TopicCounts::default();
        for row in &inner.rows {
            match row {
                Record::Message(m)
                    if m.group_id == topic.group_id
                        && m.topic_id == topic.id
                        && m.created_at > topic.message_last_read =>
                {
                    counts.unread_messages += 1;
                }
                Record::Todo(t)
                    if t.group_id == topic.group_id && t.topic_id == topic.id && !t.deleted =>
                {
                    if !t.is_complete() {
                        counts.incomplete_todos += 1;
                    }
                    if !t.read {
                        counts.unread_todos += 1;
                    }
                }
                _ => {}
            }
        }
        Ok(counts)
    }

    async fn messages(
        &self,
        group: GroupId,
        topic: ItemId,
        before: Option<f64>,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        let inner = self.read()?;
        let mut messages: Vec<Message> = inner
            .rows
            .iter()
            .filter_map(|row| match row {
                Record::Message(m)
                    if m.group_id == group
                        && m.topic_id == topic
                        && before.map_or(true, |b| m.created_at < b) =>
                {
                    Some(m.clone())
                }
                _ => None,
            })
            .collect();
        messages.sort_by(roost_core::paging::newest_first);
        messages.truncate(limit);
        Ok(messages)
    }

    async fn reaction(
        &self,
        group: GroupId,
        entity: ItemId,
        rune: &str,
    ) -> Result<Option<Reaction>, StoreError> {
        let inner = self.read()?;
        Ok(inner.rows.iter().find_map(|row| match row {
            Record::Reaction(r) if r.group_id == group && r.entity_id == entity && r.rune == rune => {
                Some(r.clone())
            }
            _ => None,
        }))
    }

    async fn reactions(&self, group: GroupId, entity: ItemId) -> Result<Vec<Reaction>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .rows
            .iter()
            .filter_map(|row| match row {
                Record::Reaction(r) if r.group_id == group && r.entity_id == entity => {
                    Some(r.clone())
                }
                _ => None,
            })
            .collect())
    }

    async fn search_text(
        &self,
        scope: &SearchScope,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let inner = self.read()?;
        let terms = snippet::terms(&scope.term);
        Ok(inner
            .ranked(scope)
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(entity_id, topic_id, kind, body)| SearchHit {
                entity_id,
                group_id: scope.group_id,
                topic_id,
                topic_name: inner.topic_label(topic_id),
                kind,
                text: snippet::snippet(body, &terms, &scope.highlight_start, &scope.highlight_end),
            })
            .collect())
    }

    async fn count_matches(&self, scope: &SearchScope) -> Result<usize, StoreError> {
        Ok(self.read()?.ranked(scope).len())
    }

    fn subscribe(&self, kinds: &[EntityKind]) -> mpsc::UnboundedReceiver<ChangeSet> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push((kinds.to_vec(), tx));
        rx
    }
}
