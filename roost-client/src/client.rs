//! Roost - the command surface applications talk to.
//!
//! [`Roost`] owns a [`Store`], the update stream and the write lock.
//! [`RoostGroup`] is a borrowed handle scoping commands to one group.
//!
//! # Architecture
//!
//! ```text
//! Application → Roost / RoostGroup → Store → persistence
//!                    ↓                  ↓ (change sets)
//!               roost-core        forwarder task → Updates
//! ```
//!
//! Every command that reads a list and writes positions back holds the
//! write lock for the whole read-compute-write sequence, so two commands
//! in this process never plan against the same stale list. Concurrent
//! writers elsewhere are resolved by the store (last writer wins).
//!
//! # Example
//!
//! ```ignore
//! use roost_client::{MemoryStore, Roost, RoostConfig};
//!
//! let roost = Roost::new(MemoryStore::new(), RoostConfig::default())?;
//! roost.start().await?;
//! let group = roost.create_group("family").await?;
//! let group = roost.group(group);
//! let home = group.topics(false).await?[0].id;
//! group.create_todo(home, "mow the lawn").await?;
//! group.move_todo(home, false, 0, 0).await?;
//! ```

use std::collections::HashMap;
use std::sync::{Mutex as SyncMutex, PoisonError};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

use roost_core::{
    append_position, plan_move, validate_rune, MovePlan, Page, PageCursor, SearchResults,
    TodoBatch,
};
use roost_types::{
    now, AppState, ChangeSet, EntityKind, EntityUpdate, FieldChange, Group, GroupId,
    GroupSummary, ItemId, ListEntry, ListSelector, Message, Reaction, Record, SearchScope, Todo,
    Topic, TopicCounts, TopicSummary, Update, ViewUpdate, WriteBatch,
};

use crate::config::RoostConfig;
use crate::error::ClientError;
use crate::store::Store;
use crate::updates::{self, UpdateError, UpdateSender, Updates};

/// One page of message history, newest first.
pub type MessagePage = Page<Message>;

/// Label of the topic every new group starts with.
pub const HOME_TOPIC: &str = "home";

/// The application-facing client.
pub struct Roost<S: Store> {
    store: S,
    config: RoostConfig,
    updates_tx: UpdateSender,
    updates_rx: SyncMutex<Option<Updates>>,
    forwarder: SyncMutex<Option<Forwarder>>,
    write_lock: Mutex<()>,
}

impl<S: Store> Roost<S> {
    /// Create a client over `store`.
    ///
    /// Nothing runs until [`Roost::start`].
    pub fn new(store: S, config: RoostConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let (updates_tx, updates_rx) = updates::channel(config.updates.channel_capacity);
        Ok(Self {
            store,
            config,
            updates_tx,
            updates_rx: SyncMutex::new(Some(updates_rx)),
            forwarder: SyncMutex::new(None),
            write_lock: Mutex::new(()),
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &RoostConfig {
        &self.config
    }

    /// Take the update reader. Only the first call returns it.
    pub fn updates(&self) -> Option<Updates> {
        self.updates_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// A producer handle for external notifiers (group state, transport).
    pub fn update_sender(&self) -> UpdateSender {
        self.updates_tx.clone()
    }

    /// Start forwarding store changes to the update stream.
    ///
    /// Must be called from within a tokio runtime. Calling it again is a
    /// no-op; calling it after [`Roost::shutdown`] fails without starting
    /// anything.
    pub async fn start(&self) -> Result<(), ClientError> {
        {
            let mut forwarder = self.forwarder.lock().unwrap_or_else(PoisonError::into_inner);
            if self.updates_tx.is_shut_down() {
                tracing::warn!("Roost started after shutdown");
                return Err(UpdateError::ShutDown.into());
            }
            if forwarder.is_some() {
                tracing::debug!("Roost already started");
                return Ok(());
            }
            let changes = self.store.subscribe(&[
                EntityKind::Topic,
                EntityKind::Todo,
                EntityKind::Message,
                EntityKind::Reaction,
            ]);
            let (stop, stopped) = oneshot::channel();
            *forwarder = Some(Forwarder {
                handle: tokio::spawn(forward_changes(changes, self.updates_tx.clone(), stopped)),
                stop,
            });
        }
        self.updates_tx
            .push(Update::AppState(AppState::Running))
            .await?;
        tracing::info!("Roost started");
        Ok(())
    }

    /// Stop forwarding and end the update stream.
    ///
    /// Changes from every write that already returned are forwarded first,
    /// then [`Update::Finished`] is queued behind them. Like any producer,
    /// this waits while the stream buffer is full.
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        let forwarder = self
            .forwarder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(Forwarder { handle, stop }) = forwarder {
            // The task may already have exited on a closed stream.
            let _ = stop.send(());
            if let Err(e) = handle.await {
                tracing::warn!("Update forwarder failed: {}", e);
            }
        }
        self.updates_tx.shutdown().await?;
        tracing::info!("Roost shut down");
        Ok(())
    }

    /// Scope commands to one group.
    pub fn group(&self, id: GroupId) -> RoostGroup<'_, S> {
        RoostGroup { roost: self, id }
    }

    /// Create a group together with its `home` topic.
    pub async fn create_group(&self, name: &str) -> Result<GroupId, ClientError> {
        let id = GroupId::new();
        let created_at = now();
        let home = Topic {
            id: ItemId::new(),
            group_id: id,
            created_at,
            modified_at: created_at,
            label: HOME_TOPIC.to_string(),
            message_last_read: 0.0,
            show_completed: false,
            pinned: false,
            position: append_position(None),
            pin_position: 0.0,
        };

        let mut batch = WriteBatch::new();
        batch
            .insert(Record::Group(Group {
                id,
                name: name.to_string(),
                created_at,
            }))
            .insert(Record::Topic(home));
        self.commit(batch).await?;

        tracing::info!("Created group {} ({})", id, name);
        Ok(id)
    }

    /// Every group with the counts of all its topics, oldest first.
    pub async fn groups(&self) -> Result<Vec<GroupSummary>, ClientError> {
        let groups = self.store.groups().await?;
        let mut summaries = Vec::with_capacity(groups.len());
        for group in groups {
            let counts = self.group(group.id).counts().await?;
            summaries.push(GroupSummary { group, counts });
        }
        Ok(summaries)
    }

    /// Unread messages across every topic of every group.
    pub async fn unread_message_count(&self) -> Result<usize, ClientError> {
        Ok(self
            .groups()
            .await?
            .iter()
            .map(|g| g.counts.unread_messages)
            .sum())
    }

    /// Move the member at `from` to `to` within one list.
    ///
    /// Returns the plan that was written.
    pub async fn move_in_list(
        &self,
        list: ListSelector,
        from: usize,
        to: usize,
    ) -> Result<MovePlan, ClientError> {
        let _guard = self.write_lock.lock().await;

        let entries = self.store.read_list(&list).await?;
        let plan = plan_move(&entries, from, to)?;
        if plan.repaired() {
            tracing::info!(
                "Repairing all-zero positions in {} ({} members)",
                list,
                entries.len()
            );
        }
        tracing::debug!(
            "Move in {}: {} -> {} (position {} -> {})",
            list,
            from,
            to,
            plan.previous,
            plan.moved.position
        );

        let field = list.position_field();
        let mut batch = WriteBatch::new();
        batch.extend(plan.writes().map(|w| w.into_field_write(field)));
        self.commit(batch).await?;
        Ok(plan)
    }

    /// First page of a search.
    pub async fn search(
        &self,
        group: GroupId,
        term: &str,
        highlight_start: &str,
        highlight_end: &str,
    ) -> Result<SearchResults, ClientError> {
        let scope = SearchScope {
            group_id: group,
            term: term.to_string(),
            highlight_start: highlight_start.to_string(),
            highlight_end: highlight_end.to_string(),
        };
        self.fetch_search(scope, 0).await
    }

    /// The page after `previous`, with `total` recounted.
    pub async fn next_page(&self, previous: &SearchResults) -> Result<SearchResults, ClientError> {
        let offset = previous.next_offset(self.config.paging.search_page_size);
        self.fetch_search(previous.scope.clone(), offset).await
    }

    /// Start a batch of todo edits.
    pub fn todo_batch(&self) -> TodoBatch {
        TodoBatch::new()
    }

    /// Apply a todo batch in one write.
    ///
    /// Every todo in the batch must exist; otherwise nothing is written.
    pub async fn commit_todos(&self, batch: TodoBatch) -> Result<(), ClientError> {
        if batch.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;

        let ids: Vec<ItemId> = batch.ids().collect();
        let mut topic_of = HashMap::new();
        for id in ids {
            match self.store.record(id).await? {
                Some(Record::Todo(todo)) => {
                    topic_of.insert(id, (todo.group_id, todo.topic_id, todo.is_complete()));
                }
                _ => return Err(ClientError::NotFound(format!("todo {}", id))),
            }
        }

        // Reopened todos are appended after the current end of their list,
        // one after another when several land in the same topic. Todos that
        // are already open keep their place.
        let reopened: Vec<ItemId> = batch
            .reopened()
            .filter(|id| matches!(topic_of.get(id), Some(&(_, _, true))))
            .collect();
        let mut maxima: HashMap<(GroupId, ItemId), Option<f64>> = HashMap::new();
        for id in &reopened {
            if let Some(&(group, topic, _)) = topic_of.get(id) {
                if !maxima.contains_key(&(group, topic)) {
                    let list = ListSelector::todos(group, topic, false);
                    let max = self.store.read_list(&list).await?.last().map(|e| e.position);
                    maxima.insert((group, topic), max);
                }
            }
        }

        let writes = batch.into_writes(now(), |id| {
            let &(group, topic, complete) = topic_of.get(&id)?;
            if !complete {
                return None;
            }
            let max = maxima.entry((group, topic)).or_insert(None);
            let position = append_position(*max);
            *max = Some(position);
            Some(position)
        });
        tracing::debug!(
            "Committing todo batch: {} todos, {} reopened",
            topic_of.len(),
            reopened.len()
        );
        self.commit(writes).await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), ClientError> {
        self.store.write(batch).await.map_err(|e| {
            tracing::warn!("Write failed: {}", e);
            ClientError::Storage(e)
        })
    }

    async fn fetch_search(
        &self,
        scope: SearchScope,
        offset: usize,
    ) -> Result<SearchResults, ClientError> {
        let page_size = self.config.paging.search_page_size;
        let total = self.store.count_matches(&scope).await?;
        let results = self.store.search_text(&scope, page_size, offset).await?;
        tracing::debug!(
            "Search {:?} at offset {}: {} of {}",
            scope.term,
            offset,
            results.len(),
            total
        );
        Ok(SearchResults::new(scope, offset, total, results))
    }

    /// Members of `list` in list order.
    async fn members(&self, list: &ListSelector) -> Result<Vec<Record>, ClientError> {
        let mut members: Vec<(ListEntry, Record)> = self
            .store
            .list_records(list)
            .await?
            .into_iter()
            .filter_map(|record| {
                let entry = ListEntry {
                    id: record.item_id()?,
                    position: record.position_in(list)?,
                    created_at: record.created_at(),
                };
                Some((entry, record))
            })
            .collect();
        members.sort_by(|a, b| a.0.list_order(&b.0));
        Ok(members.into_iter().map(|(_, record)| record).collect())
    }

    /// Position after the current last member of `list`.
    async fn append_to(&self, list: &ListSelector) -> Result<f64, ClientError> {
        let entries = self.store.read_list(list).await?;
        Ok(append_position(entries.last().map(|e| e.position)))
    }
}

struct Forwarder {
    handle: JoinHandle<()>,
    stop: oneshot::Sender<()>,
}

/// Turn store change sets into row and view updates until stopped.
///
/// On stop, change sets already queued are drained before returning. A
/// dropped stop handle counts as a stop.
async fn forward_changes(
    mut changes: mpsc::UnboundedReceiver<ChangeSet>,
    updates: UpdateSender,
    mut stop: oneshot::Receiver<()>,
) {
    tracing::debug!("Update forwarder started");
    loop {
        tokio::select! {
            set = changes.recv() => {
                let Some(set) = set else { break };
                if let Err(e) = forward(&set, &updates).await {
                    tracing::debug!("Update forwarder stopping: {}", e);
                    return;
                }
            }
            _ = &mut stop => {
                while let Ok(set) = changes.try_recv() {
                    if let Err(e) = forward(&set, &updates).await {
                        tracing::debug!("Update forwarder stopping: {}", e);
                        return;
                    }
                }
                break;
            }
        }
    }
    tracing::debug!("Update forwarder stopped");
}

async fn forward(set: &ChangeSet, updates: &UpdateSender) -> Result<(), UpdateError> {
    for change in &set.changes {
        updates
            .push(Update::Entity(EntityUpdate {
                view: change.kind,
                group_id: change.group_id,
                entity_id: change.id,
            }))
            .await?;
    }
    for view in set.kinds() {
        updates.push(Update::View(ViewUpdate { view })).await?;
    }
    Ok(())
}

/// Commands scoped to one group.
pub struct RoostGroup<'a, S: Store> {
    roost: &'a Roost<S>,
    id: GroupId,
}

impl<'a, S: Store> RoostGroup<'a, S> {
    /// The group id.
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// The group row.
    pub async fn info(&self) -> Result<Group, ClientError> {
        self.roost
            .store
            .group(self.id)
            .await?
            .ok_or_else(|| ClientError::NotFound(format!("group {}", self.id)))
    }

    /// The group row with counts summed over its topics.
    pub async fn summary(&self) -> Result<GroupSummary, ClientError> {
        let group = self.info().await?;
        let counts = self.counts().await?;
        Ok(GroupSummary { group, counts })
    }

    async fn counts(&self) -> Result<TopicCounts, ClientError> {
        let mut counts = TopicCounts::default();
        for pinned in [true, false] {
            for topic in self.topics(pinned).await? {
                counts += self.roost.store.topic_counts(&topic).await?;
            }
        }
        Ok(counts)
    }

    // ----- topics -----

    /// Create an unpinned topic at the end of the list.
    pub async fn create_topic(&self, label: &str) -> Result<ItemId, ClientError> {
        self.insert_topic(label, false).await
    }

    /// Create a pinned topic at the end of the pinned list.
    pub async fn create_topic_pinned(&self, label: &str) -> Result<ItemId, ClientError> {
        self.insert_topic(label, true).await
    }

    async fn insert_topic(&self, label: &str, pinned: bool) -> Result<ItemId, ClientError> {
        self.info().await?;
        let _guard = self.roost.write_lock.lock().await;

        let position = self
            .roost
            .append_to(&ListSelector::topics(self.id, pinned))
            .await?;
        let created_at = now();
        let topic = Topic {
            id: ItemId::new(),
            group_id: self.id,
            created_at,
            modified_at: created_at,
            label: label.to_string(),
            message_last_read: 0.0,
            show_completed: false,
            pinned,
            position: if pinned { 0.0 } else { position },
            pin_position: if pinned { position } else { 0.0 },
        };
        let id = topic.id;

        let mut batch = WriteBatch::new();
        batch.insert(Record::Topic(topic));
        self.roost.commit(batch).await?;
        tracing::debug!("Created topic {} in group {}", id, self.id);
        Ok(id)
    }

    /// Look up a topic of this group.
    pub async fn topic(&self, id: ItemId) -> Result<Topic, ClientError> {
        match self.roost.store.record(id).await? {
            Some(Record::Topic(topic)) if topic.group_id == self.id => Ok(topic),
            _ => Err(ClientError::NotFound(format!("topic {}", id))),
        }
    }

    /// Pinned or unpinned topics in list order.
    pub async fn topics(&self, pinned: bool) -> Result<Vec<Topic>, ClientError> {
        let records = self
            .roost
            .members(&ListSelector::topics(self.id, pinned))
            .await?;
        Ok(records
            .into_iter()
            .filter_map(|record| match record {
                Record::Topic(topic) => Some(topic),
                _ => None,
            })
            .collect())
    }

    /// A topic with its unread and open-todo counts.
    pub async fn topic_summary(&self, id: ItemId) -> Result<TopicSummary, ClientError> {
        let topic = self.topic(id).await?;
        let counts = self.roost.store.topic_counts(&topic).await?;
        Ok(TopicSummary { topic, counts })
    }

    /// Pinned or unpinned topics in list order, with counts.
    pub async fn topic_summaries(&self, pinned: bool) -> Result<Vec<TopicSummary>, ClientError> {
        let topics = self.topics(pinned).await?;
        let mut summaries = Vec::with_capacity(topics.len());
        for topic in topics {
            let counts = self.roost.store.topic_counts(&topic).await?;
            summaries.push(TopicSummary { topic, counts });
        }
        Ok(summaries)
    }

    /// Rename a topic.
    pub async fn update_topic(&self, id: ItemId, label: &str) -> Result<(), ClientError> {
        self.topic(id).await?;
        self.update(id, FieldChange::Label(label.to_string())).await
    }

    /// Record that every message in the topic has been read.
    pub async fn mark_topic_read(&self, id: ItemId) -> Result<(), ClientError> {
        self.topic(id).await?;
        self.update(id, FieldChange::MessageLastRead(now())).await
    }

    /// Show or hide completed todos.
    pub async fn set_show_completed(&self, id: ItemId, show: bool) -> Result<(), ClientError> {
        self.topic(id).await?;
        self.update(id, FieldChange::ShowCompleted(show)).await
    }

    /// Move a topic between the pinned and unpinned lists.
    ///
    /// It lands at the end of the destination list.
    pub async fn pin_topic(&self, id: ItemId, pinned: bool) -> Result<(), ClientError> {
        let _guard = self.roost.write_lock.lock().await;
        let topic = self.topic(id).await?;
        if topic.pinned == pinned {
            return Ok(());
        }

        let list = ListSelector::topics(self.id, pinned);
        let position = self.roost.append_to(&list).await?;
        let mut batch = WriteBatch::new();
        batch
            .update(id, FieldChange::Pinned(pinned))
            .update(id, FieldChange::Position(list.position_field(), position));
        self.roost.commit(batch).await?;
        tracing::debug!("Topic {} moved to {}", id, list);
        Ok(())
    }

    /// Reorder the pinned or unpinned topics.
    pub async fn move_topic(
        &self,
        pinned: bool,
        from: usize,
        to: usize,
    ) -> Result<MovePlan, ClientError> {
        self.roost
            .move_in_list(ListSelector::topics(self.id, pinned), from, to)
            .await
    }

    // ----- todos -----

    /// Create a todo at the end of the topic's incomplete list.
    pub async fn create_todo(&self, topic: ItemId, body: &str) -> Result<ItemId, ClientError> {
        self.topic(topic).await?;
        let _guard = self.roost.write_lock.lock().await;

        let position = self
            .roost
            .append_to(&ListSelector::todos(self.id, topic, false))
            .await?;
        let created_at = now();
        let todo = Todo {
            id: ItemId::new(),
            group_id: self.id,
            topic_id: topic,
            created_at,
            modified_at: created_at,
            body: body.to_string(),
            completed_at: 0.0,
            completed_position: 0.0,
            deleted: false,
            read: true,
            position,
        };
        let id = todo.id;

        let mut batch = WriteBatch::new();
        batch.insert(Record::Todo(todo));
        self.roost.commit(batch).await?;
        Ok(id)
    }

    /// Look up a todo of this group.
    pub async fn todo(&self, id: ItemId) -> Result<Todo, ClientError> {
        match self.roost.store.record(id).await? {
            Some(Record::Todo(todo)) if todo.group_id == self.id => Ok(todo),
            _ => Err(ClientError::NotFound(format!("todo {}", id))),
        }
    }

    /// Complete or incomplete todos of a topic in list order.
    pub async fn todos(&self, topic: ItemId, complete: bool) -> Result<Vec<Todo>, ClientError> {
        let records = self
            .roost
            .members(&ListSelector::todos(self.id, topic, complete))
            .await?;
        Ok(records
            .into_iter()
            .filter_map(|record| match record {
                Record::Todo(todo) => Some(todo),
                _ => None,
            })
            .collect())
    }

    /// Replace a todo's text.
    pub async fn update_todo(&self, id: ItemId, body: &str) -> Result<(), ClientError> {
        self.todo(id).await?;
        self.update(id, FieldChange::Body(body.to_string())).await
    }

    /// Soft-delete a todo; it leaves every list and search.
    pub async fn delete_todo(&self, id: ItemId) -> Result<(), ClientError> {
        self.todo(id).await?;
        self.update(id, FieldChange::Deleted(true)).await
    }

    /// Reorder a topic's complete or incomplete todos.
    pub async fn move_todo(
        &self,
        topic: ItemId,
        complete: bool,
        from: usize,
        to: usize,
    ) -> Result<MovePlan, ClientError> {
        self.roost
            .move_in_list(ListSelector::todos(self.id, topic, complete), from, to)
            .await
    }

    // ----- messages -----

    /// Post a message and mark the topic read up to now.
    pub async fn create_message(&self, topic: ItemId, body: &str) -> Result<ItemId, ClientError> {
        self.topic(topic).await?;
        let created_at = now();
        let message = Message {
            id: ItemId::new(),
            group_id: self.id,
            topic_id: topic,
            created_at,
            modified_at: created_at,
            body: body.to_string(),
        };
        let id = message.id;

        let mut batch = WriteBatch::new();
        batch
            .insert(Record::Message(message))
            .update(topic, FieldChange::MessageLastRead(created_at));
        self.roost.commit(batch).await?;
        Ok(id)
    }

    /// Look up a message of this group.
    pub async fn message(&self, id: ItemId) -> Result<Message, ClientError> {
        match self.roost.store.record(id).await? {
            Some(Record::Message(message)) if message.group_id == self.id => Ok(message),
            _ => Err(ClientError::NotFound(format!("message {}", id))),
        }
    }

    /// One page of a topic's history. Pass `""` for the newest page and
    /// the previous page's cursor after that.
    pub async fn messages(&self, topic: ItemId, cursor: &str) -> Result<MessagePage, ClientError> {
        let cursor = PageCursor::parse(cursor)?;
        let page_size = self.roost.config.paging.messages_page_size;
        let items = self
            .roost
            .store
            .messages(self.id, topic, cursor.map(|c| c.timestamp()), page_size)
            .await?;
        Ok(Page::from_batch(items, page_size))
    }

    /// Replace a message's text.
    pub async fn update_message(&self, id: ItemId, body: &str) -> Result<(), ClientError> {
        self.message(id).await?;
        self.update(id, FieldChange::Body(body.to_string())).await
    }

    // ----- reactions -----

    /// Set or clear a reaction on any row of this group.
    ///
    /// `rune` must be exactly one grapheme cluster. Returns the reaction id.
    pub async fn set_reaction(
        &self,
        entity: ItemId,
        rune: &str,
        active: bool,
    ) -> Result<ItemId, ClientError> {
        validate_rune(rune)?;
        match self.roost.store.record(entity).await? {
            Some(record) if record.group_id() == self.id => {}
            _ => return Err(ClientError::NotFound(format!("row {}", entity))),
        }

        if let Some(existing) = self.roost.store.reaction(self.id, entity, rune).await? {
            if existing.active != active {
                self.update(existing.id, FieldChange::Active(active)).await?;
            }
            return Ok(existing.id);
        }

        let created_at = now();
        let reaction = Reaction {
            id: ItemId::new(),
            group_id: self.id,
            entity_id: entity,
            created_at,
            modified_at: created_at,
            rune: rune.to_string(),
            active,
        };
        let id = reaction.id;
        let mut batch = WriteBatch::new();
        batch.insert(Record::Reaction(reaction));
        self.roost.commit(batch).await?;
        Ok(id)
    }

    /// Active reactions on a row.
    pub async fn reactions(&self, entity: ItemId) -> Result<Vec<Reaction>, ClientError> {
        let mut reactions = self.roost.store.reactions(self.id, entity).await?;
        reactions.retain(|r| r.active);
        Ok(reactions)
    }

    // ----- search -----

    /// First page of a search within this group.
    pub async fn search(
        &self,
        term: &str,
        highlight_start: &str,
        highlight_end: &str,
    ) -> Result<SearchResults, ClientError> {
        self.roost
            .search(self.id, term, highlight_start, highlight_end)
            .await
    }

    async fn update(&self, id: ItemId, change: FieldChange) -> Result<(), ClientError> {
        let mut batch = WriteBatch::new();
        batch.update(id, change);
        self.roost.commit(batch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use roost_types::{SearchHitKind, UpdateKind};

    async fn setup() -> (Roost<MemoryStore>, GroupId, ItemId) {
        setup_with(RoostConfig::default()).await
    }

    async fn setup_with(config: RoostConfig) -> (Roost<MemoryStore>, GroupId, ItemId) {
        let roost = Roost::new(MemoryStore::new(), config).unwrap();
        let group = roost.create_group("family").await.unwrap();
        let home = roost.group(group).topics(false).await.unwrap()[0].id;
        (roost, group, home)
    }

    async fn five_todos(roost: &Roost<MemoryStore>, group: GroupId, topic: ItemId) {
        for label in ["1", "2", "3", "4", "5"] {
            roost.group(group).create_todo(topic, label).await.unwrap();
        }
    }

    async fn bodies(roost: &Roost<MemoryStore>, group: GroupId, topic: ItemId) -> Vec<String> {
        roost
            .group(group)
            .todos(topic, false)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.body)
            .collect()
    }

    async fn labels(roost: &Roost<MemoryStore>, group: GroupId) -> Vec<String> {
        roost
            .group(group)
            .topics(false)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.label)
            .collect()
    }

    fn message_at(group: GroupId, topic: ItemId, created_at: f64) -> Message {
        Message {
            id: ItemId::new(),
            group_id: group,
            topic_id: topic,
            created_at,
            modified_at: created_at,
            body: format!("at {}", created_at),
        }
    }

    // ===========================================
    // Group Tests
    // ===========================================

    #[tokio::test]
    async fn create_group_adds_home_topic() {
        let (roost, group, home) = setup().await;
        let info = roost.group(group).info().await.unwrap();
        assert_eq!(info.name, "family");

        let topic = roost.group(group).topic(home).await.unwrap();
        assert_eq!(topic.label, HOME_TOPIC);
        assert_eq!(topic.position, 0.0);
        assert!(roost.group(group).topics(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_group_is_not_found() {
        let (roost, _, _) = setup().await;
        let err = roost
            .group(GroupId::new())
            .create_topic("x")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let mut config = RoostConfig::default();
        config.updates.channel_capacity = 0;
        assert!(matches!(
            Roost::new(MemoryStore::new(), config),
            Err(ClientError::Config(_))
        ));
    }

    // ===========================================
    // Unread Count Tests
    // ===========================================

    /// A message written by another member.
    async fn incoming_message(roost: &Roost<MemoryStore>, group: GroupId, topic: ItemId) {
        let created_at = now();
        let mut batch = WriteBatch::new();
        batch.insert(Record::Message(Message {
            id: ItemId::new(),
            group_id: group,
            topic_id: topic,
            created_at,
            modified_at: created_at,
            body: "hi".into(),
        }));
        roost.store().write(batch).await.unwrap();
    }

    #[tokio::test]
    async fn mark_topic_read_clears_unread_messages() {
        let (roost, group, home) = setup().await;
        let g = roost.group(group);
        incoming_message(&roost, group, home).await;

        assert_eq!(g.topic_summary(home).await.unwrap().counts.unread_messages, 1);
        g.mark_topic_read(home).await.unwrap();
        assert_eq!(g.topic_summary(home).await.unwrap().counts.unread_messages, 0);
    }

    #[tokio::test]
    async fn own_messages_are_not_unread() {
        let (roost, group, home) = setup().await;
        let g = roost.group(group);
        g.create_message(home, "hello there").await.unwrap();

        assert_eq!(g.topic_summary(home).await.unwrap().counts.unread_messages, 0);
        assert_eq!(roost.unread_message_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unread_counts_sum_across_groups() {
        let roost = Roost::new(MemoryStore::new(), RoostConfig::default()).unwrap();
        let mut per_group = Vec::new();
        for (name, first, second) in [("group1", 2, 1), ("group2", 1, 1), ("group3", 1, 2)] {
            let group = roost.create_group(name).await.unwrap();
            let g = roost.group(group);
            let hi = g.create_topic("hi").await.unwrap();
            let hi2 = g.create_topic("hi2").await.unwrap();
            for _ in 0..first {
                incoming_message(&roost, group, hi).await;
            }
            for _ in 0..second {
                incoming_message(&roost, group, hi2).await;
            }
            per_group.push(first + second);
        }

        assert_eq!(roost.unread_message_count().await.unwrap(), 8);
        let groups = roost.groups().await.unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.group.name.as_str()).collect();
        assert_eq!(names, ["group1", "group2", "group3"]);
        let unread: Vec<usize> = groups.iter().map(|g| g.counts.unread_messages).collect();
        assert_eq!(unread, per_group);
    }

    #[tokio::test]
    async fn todo_counts_track_completion_read_and_delete() {
        let (roost, group, home) = setup().await;
        let g = roost.group(group);
        let a = g.create_todo(home, "a").await.unwrap();
        let b = g.create_todo(home, "b").await.unwrap();
        let c = g.create_todo(home, "c").await.unwrap();

        let mut batch = roost.todo_batch();
        batch.mark_complete(a, true).mark_read(b, false);
        roost.commit_todos(batch).await.unwrap();
        g.delete_todo(c).await.unwrap();

        let counts = g.topic_summary(home).await.unwrap().counts;
        assert_eq!(counts.incomplete_todos, 1);
        assert_eq!(counts.unread_todos, 1);

        let pinned = g.create_topic_pinned("errands").await.unwrap();
        g.create_todo(pinned, "milk").await.unwrap();
        let summary = g.summary().await.unwrap();
        assert_eq!(summary.group.name, "family");
        assert_eq!(summary.counts.incomplete_todos, 2);
        assert_eq!(summary.counts.unread_todos, 1);

        let listed = g.topic_summaries(true).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].topic.id, pinned);
        assert_eq!(listed[0].counts.incomplete_todos, 1);
    }

    // ===========================================
    // Todo Reorder Tests
    // ===========================================

    #[tokio::test]
    async fn todos_are_created_in_order() {
        let (roost, group, home) = setup().await;
        five_todos(&roost, group, home).await;
        assert_eq!(bodies(&roost, group, home).await, ["1", "2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn move_todo_up_one() {
        let (roost, group, home) = setup().await;
        five_todos(&roost, group, home).await;
        roost.group(group).move_todo(home, false, 3, 2).await.unwrap();
        assert_eq!(bodies(&roost, group, home).await, ["1", "2", "4", "3", "5"]);
    }

    #[tokio::test]
    async fn move_todo_to_top() {
        let (roost, group, home) = setup().await;
        five_todos(&roost, group, home).await;
        roost.group(group).move_todo(home, false, 3, 0).await.unwrap();
        assert_eq!(bodies(&roost, group, home).await, ["4", "1", "2", "3", "5"]);
    }

    #[tokio::test]
    async fn move_todo_to_end() {
        let (roost, group, home) = setup().await;
        five_todos(&roost, group, home).await;
        roost.group(group).move_todo(home, false, 3, 4).await.unwrap();
        assert_eq!(bodies(&roost, group, home).await, ["1", "2", "3", "5", "4"]);
    }

    #[tokio::test]
    async fn invalid_move_writes_nothing() {
        let (roost, group, home) = setup().await;
        five_todos(&roost, group, home).await;
        let before = roost.store().committed_batches();

        let err = roost
            .group(group)
            .move_todo(home, false, 5, 0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidIndex {
                from: 5,
                to: 0,
                len: 5
            }
        ));
        assert_eq!(roost.store().committed_batches(), before);
    }

    #[tokio::test]
    async fn move_in_empty_list_is_invalid() {
        let (roost, group, home) = setup().await;
        let err = roost
            .group(group)
            .move_todo(home, true, 0, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidIndex { len: 0, .. }));
    }

    // ===========================================
    // Topic Reorder Tests
    // ===========================================

    #[tokio::test]
    async fn move_topic_down_one() {
        let (roost, group, _) = setup().await;
        for label in ["four", "five", "six", "seven"] {
            roost.group(group).create_topic(label).await.unwrap();
        }
        assert_eq!(
            labels(&roost, group).await,
            ["home", "four", "five", "six", "seven"]
        );

        roost.group(group).move_topic(false, 1, 2).await.unwrap();
        assert_eq!(
            labels(&roost, group).await,
            ["home", "five", "four", "six", "seven"]
        );
    }

    #[tokio::test]
    async fn move_topic_repairs_all_zero_positions() {
        let roost = Roost::new(MemoryStore::new(), RoostConfig::default()).unwrap();
        let group = GroupId::new();
        let mut batch = WriteBatch::new();
        batch.insert(Record::Group(Group {
            id: group,
            name: "migrated".into(),
            created_at: 1.0,
        }));
        for (i, label) in ["home", "four", "five", "six", "seven"].iter().enumerate() {
            batch.insert(Record::Topic(Topic {
                id: ItemId::new(),
                group_id: group,
                created_at: 1.0 + i as f64,
                modified_at: 1.0,
                label: label.to_string(),
                message_last_read: 0.0,
                show_completed: false,
                pinned: false,
                position: 0.0,
                pin_position: 0.0,
            }));
        }
        roost.store().write(batch).await.unwrap();

        let plan = roost.group(group).move_topic(false, 1, 2).await.unwrap();
        assert!(plan.repaired());
        assert_eq!(
            labels(&roost, group).await,
            ["home", "five", "four", "six", "seven"]
        );

        let positions: Vec<f64> = roost
            .group(group)
            .topics(false)
            .await
            .unwrap()
            .iter()
            .map(|t| t.position)
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn pin_and_unpin_allocate_fresh_positions() {
        let (roost, group, home) = setup().await;
        let g = roost.group(group);
        let a = g.create_topic("a").await.unwrap();
        let pinned = g.create_topic_pinned("pinned").await.unwrap();

        g.pin_topic(a, true).await.unwrap();
        let pins: Vec<ItemId> = g.topics(true).await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(pins, vec![pinned, a]);
        let a_topic = g.topic(a).await.unwrap();
        assert!(a_topic.pin_position > g.topic(pinned).await.unwrap().pin_position);

        g.pin_topic(home, true).await.unwrap();
        g.pin_topic(home, false).await.unwrap();
        let unpinned: Vec<String> = g
            .topics(false)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.label)
            .collect();
        assert_eq!(unpinned, ["home"]);
    }

    #[tokio::test]
    async fn pin_topic_same_state_is_noop() {
        let (roost, group, home) = setup().await;
        let before = roost.store().committed_batches();
        roost.group(group).pin_topic(home, false).await.unwrap();
        assert_eq!(roost.store().committed_batches(), before);
    }

    #[tokio::test]
    async fn topic_fields_update() {
        let (roost, group, home) = setup().await;
        let g = roost.group(group);
        g.update_topic(home, "house").await.unwrap();
        g.set_show_completed(home, true).await.unwrap();
        g.mark_topic_read(home).await.unwrap();

        let topic = g.topic(home).await.unwrap();
        assert_eq!(topic.label, "house");
        assert!(topic.show_completed);
        assert!(topic.message_last_read > 0.0);
    }

    // ===========================================
    // Todo Batch Tests
    // ===========================================

    #[tokio::test]
    async fn completing_moves_todo_to_complete_list() {
        let (roost, group, home) = setup().await;
        five_todos(&roost, group, home).await;
        let g = roost.group(group);
        let two = g.todos(home, false).await.unwrap()[1].id;

        let mut batch = roost.todo_batch();
        batch.mark_complete(two, true);
        roost.commit_todos(batch).await.unwrap();

        assert_eq!(bodies(&roost, group, home).await, ["1", "3", "4", "5"]);
        let done = g.todos(home, true).await.unwrap();
        assert_eq!(done.len(), 1);
        assert!(done[0].completed_at > 0.0);
        assert_eq!(done[0].completed_position, -done[0].completed_at);
    }

    #[tokio::test]
    async fn reopening_appends_to_incomplete_list() {
        let (roost, group, home) = setup().await;
        five_todos(&roost, group, home).await;
        let g = roost.group(group);
        let todos = g.todos(home, false).await.unwrap();
        let (one, two) = (todos[0].id, todos[1].id);

        let mut batch = roost.todo_batch();
        batch.mark_complete(one, true).mark_complete(two, true);
        roost.commit_todos(batch).await.unwrap();

        let mut batch = roost.todo_batch();
        batch.mark_complete(two, false).mark_complete(one, false);
        roost.commit_todos(batch).await.unwrap();

        let order = bodies(&roost, group, home).await;
        assert_eq!(&order[..3], ["3", "4", "5"]);
        assert_eq!(order.len(), 5);
        let reopened = g.todo(one).await.unwrap();
        assert_eq!(reopened.completed_at, 0.0);
        assert_eq!(reopened.completed_position, 0.0);
        assert!(g.todos(home, true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reopening_an_open_todo_keeps_its_place() {
        let (roost, group, home) = setup().await;
        let g = roost.group(group);
        let mut ids = Vec::new();
        for body in ["1", "2", "3"] {
            ids.push(g.create_todo(home, body).await.unwrap());
        }
        let before = g.todo(ids[0]).await.unwrap();

        let mut batch = roost.todo_batch();
        batch.mark_complete(ids[0], false);
        roost.commit_todos(batch).await.unwrap();

        assert_eq!(bodies(&roost, group, home).await, ["1", "2", "3"]);
        let after = g.todo(ids[0]).await.unwrap();
        assert_eq!(after.position, before.position);
        assert_eq!(after.modified_at, before.modified_at);
    }

    #[tokio::test]
    async fn mark_read_updates_flag() {
        let (roost, group, home) = setup().await;
        let id = roost.group(group).create_todo(home, "x").await.unwrap();

        let mut batch = roost.todo_batch();
        batch.mark_read(id, false);
        roost.commit_todos(batch).await.unwrap();
        assert!(!roost.group(group).todo(id).await.unwrap().read);
    }

    #[tokio::test]
    async fn batch_with_unknown_todo_writes_nothing() {
        let (roost, group, home) = setup().await;
        let id = roost.group(group).create_todo(home, "x").await.unwrap();
        let before = roost.store().committed_batches();

        let mut batch = roost.todo_batch();
        batch.mark_complete(id, true).mark_complete(ItemId::new(), true);
        let err = roost.commit_todos(batch).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(roost.store().committed_batches(), before);
    }

    #[tokio::test]
    async fn deleted_todo_leaves_lists() {
        let (roost, group, home) = setup().await;
        five_todos(&roost, group, home).await;
        let g = roost.group(group);
        let three = g.todos(home, false).await.unwrap()[2].id;
        g.delete_todo(three).await.unwrap();
        assert_eq!(bodies(&roost, group, home).await, ["1", "2", "4", "5"]);
    }

    // ===========================================
    // Message Paging Tests
    // ===========================================

    #[tokio::test]
    async fn messages_page_through_history() {
        let (roost, group, home) = setup().await;
        let mut batch = WriteBatch::new();
        for i in 0..43 {
            batch.insert(Record::Message(message_at(group, home, 1_000.0 + i as f64)));
        }
        roost.store().write(batch).await.unwrap();

        let g = roost.group(group);
        let mut cursor = String::new();
        let mut sizes = Vec::new();
        let mut ends = Vec::new();
        let mut seen = Vec::new();
        loop {
            let page = g.messages(home, &cursor).await.unwrap();
            sizes.push(page.items.len());
            ends.push(page.at_end);
            seen.extend(page.items.iter().map(|m| m.created_at));
            cursor = page.cursor_token();
            if page.at_end {
                break;
            }
        }

        assert_eq!(sizes, vec![20, 20, 3]);
        assert_eq!(ends, vec![false, false, true]);
        let expected: Vec<f64> = (0..43).rev().map(|i| 1_000.0 + i as f64).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn malformed_cursor_is_rejected() {
        let (roost, group, home) = setup().await;
        let err = roost
            .group(group)
            .messages(home, "not-a-time")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::MalformedCursor(_)));
    }

    #[tokio::test]
    async fn create_message_marks_topic_read() {
        let (roost, group, home) = setup().await;
        let g = roost.group(group);
        let id = g.create_message(home, "hello").await.unwrap();

        let message = g.message(id).await.unwrap();
        assert_eq!(g.topic(home).await.unwrap().message_last_read, message.created_at);

        g.update_message(id, "hello again").await.unwrap();
        assert_eq!(g.message(id).await.unwrap().body, "hello again");

        let page = g.messages(home, "").await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.at_end);
    }

    // ===========================================
    // Search Tests
    // ===========================================

    #[tokio::test]
    async fn search_finds_highlighted_todo() {
        let (roost, group, home) = setup().await;
        roost
            .group(group)
            .create_todo(home, "mow the lawn")
            .await
            .unwrap();

        let results = roost
            .group(group)
            .search("lawn", "<b>", "</b>")
            .await
            .unwrap();
        assert_eq!(results.total, 1);
        assert_eq!(results.count, 1);
        let hit = results.result(0).unwrap();
        assert_eq!(hit.text, "mow the <b>lawn</b>");
        assert_eq!(hit.kind, SearchHitKind::Todo);
        assert_eq!(hit.topic_name, HOME_TOPIC);
    }

    #[tokio::test]
    async fn multi_word_search_needs_every_word() {
        let (roost, group, home) = setup().await;
        let g = roost.group(group);
        g.create_todo(home, "mow the lawn").await.unwrap();
        g.create_todo(home, "mow nothing").await.unwrap();

        let results = g.search("mow lawn", "[", "]").await.unwrap();
        assert_eq!(results.total, 1);
        assert_eq!(results.count, 1);
        assert_eq!(results.result(0).unwrap().text, "[mow] the [lawn]");
    }

    #[tokio::test]
    async fn next_page_advances_offset_and_recounts() {
        let mut config = RoostConfig::default();
        config.paging.search_page_size = 2;
        let (roost, group, home) = setup_with(config).await;
        let g = roost.group(group);
        for _ in 0..3 {
            g.create_todo(home, "lawn").await.unwrap();
        }

        let first = g.search("lawn", "[", "]").await.unwrap();
        assert_eq!((first.offset, first.count, first.total), (0, 2, 3));
        assert!(!first.is_last_page(2));

        g.create_message(home, "lawn again").await.unwrap();
        let second = roost.next_page(&first).await.unwrap();
        assert_eq!(second.offset, 2);
        assert_eq!(second.total, 4);
        assert_eq!(second.count, 2);

        let third = roost.next_page(&second).await.unwrap();
        assert_eq!(third.offset, 4);
        assert_eq!(third.count, 0);
        assert!(third.is_last_page(2));
    }

    // ===========================================
    // Reaction Tests
    // ===========================================

    #[tokio::test]
    async fn reactions_toggle() {
        let (roost, group, home) = setup().await;
        let g = roost.group(group);
        let message = g.create_message(home, "dinner?").await.unwrap();

        let id = g.set_reaction(message, "👍", true).await.unwrap();
        assert_eq!(g.reactions(message).await.unwrap().len(), 1);

        let again = g.set_reaction(message, "👍", false).await.unwrap();
        assert_eq!(again, id);
        assert!(g.reactions(message).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn multi_grapheme_reaction_is_rejected_before_write() {
        let (roost, group, home) = setup().await;
        let g = roost.group(group);
        let message = g.create_message(home, "dinner?").await.unwrap();
        let before = roost.store().committed_batches();

        let err = g.set_reaction(message, "👍👍", true).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(roost.store().committed_batches(), before);
    }

    // ===========================================
    // Storage Failure Tests
    // ===========================================

    #[tokio::test]
    async fn write_failure_is_propagated() {
        let (roost, group, home) = setup().await;
        roost.store().fail_next_write("disk full");
        let err = roost
            .group(group)
            .create_todo(home, "x")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Storage(StoreError::Unavailable(_))
        ));
        assert!(bodies(&roost, group, home).await.is_empty());
    }

    #[tokio::test]
    async fn read_failure_is_propagated() {
        let (roost, group, home) = setup().await;
        five_todos(&roost, group, home).await;
        roost.store().fail_next_read("timeout");
        let err = roost
            .group(group)
            .move_todo(home, false, 0, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Storage(_)));
    }

    // ===========================================
    // Update Stream Tests
    // ===========================================

    #[tokio::test]
    async fn updates_are_handed_out_once() {
        let (roost, _, _) = setup().await;
        assert!(roost.updates().is_some());
        assert!(roost.updates().is_none());
    }

    #[tokio::test]
    async fn writes_produce_entity_then_view_updates() {
        let (roost, group, home) = setup().await;
        let mut updates = roost.updates().unwrap();
        roost.start().await.unwrap();
        assert_eq!(updates.next().await, Update::AppState(AppState::Running));

        let id = roost.group(group).create_todo(home, "x").await.unwrap();
        assert_eq!(
            updates.next().await,
            Update::Entity(EntityUpdate {
                view: EntityKind::Todo,
                group_id: group,
                entity_id: id,
            })
        );
        assert_eq!(
            updates.next().await,
            Update::View(ViewUpdate {
                view: EntityKind::Todo
            })
        );

        roost.shutdown().await.unwrap();
        assert_eq!(updates.next().await, Update::Finished);
        assert_eq!(updates.next().await, Update::Finished);
    }

    #[tokio::test]
    async fn message_updates_cover_message_and_topic() {
        let (roost, group, home) = setup().await;
        let mut updates = roost.updates().unwrap();
        roost.start().await.unwrap();
        updates.next().await;

        roost.group(group).create_message(home, "hi").await.unwrap();
        let mut kinds = Vec::new();
        for _ in 0..4 {
            kinds.push(updates.next().await.kind());
        }
        assert_eq!(
            kinds,
            vec![
                UpdateKind::Entity,
                UpdateKind::Entity,
                UpdateKind::View,
                UpdateKind::View
            ]
        );
    }

    #[tokio::test]
    async fn external_producers_share_the_stream() {
        let (roost, _, _) = setup().await;
        let mut updates = roost.updates().unwrap();
        let sender = roost.update_sender();
        sender.push(Update::MessagesFetched).await.unwrap();
        roost.shutdown().await.unwrap();

        assert_eq!(updates.next().await, Update::MessagesFetched);
        assert_eq!(updates.next().await, Update::Finished);
        assert_eq!(
            sender.push(Update::MessagesFetched).await,
            Err(UpdateError::ShutDown)
        );
    }

    #[tokio::test]
    async fn shutdown_forwards_changes_written_before_it() {
        let (roost, group, home) = setup().await;
        let mut updates = roost.updates().unwrap();
        roost.start().await.unwrap();
        for body in ["a", "b", "c"] {
            roost.group(group).create_todo(home, body).await.unwrap();
        }
        roost.shutdown().await.unwrap();

        let mut seen = Vec::new();
        loop {
            let update = updates.next().await;
            if update.is_finished() {
                break;
            }
            seen.push(update.kind());
        }
        assert_eq!(seen.len(), 7);
        assert_eq!(seen[0], UpdateKind::AppState);
        assert_eq!(
            seen.iter().filter(|k| **k == UpdateKind::Entity).count(),
            3
        );
    }

    #[tokio::test]
    async fn start_twice_is_noop() {
        let (roost, _, _) = setup().await;
        let mut updates = roost.updates().unwrap();
        roost.start().await.unwrap();
        roost.start().await.unwrap();
        roost.shutdown().await.unwrap();

        assert_eq!(updates.next().await, Update::AppState(AppState::Running));
        assert_eq!(updates.next().await, Update::Finished);
    }

    #[tokio::test]
    async fn start_after_shutdown_fails_without_spawning() {
        let (roost, group, home) = setup().await;
        let mut updates = roost.updates().unwrap();
        roost.shutdown().await.unwrap();

        let err = roost.start().await.unwrap_err();
        assert!(matches!(err, ClientError::Updates(UpdateError::ShutDown)));
        assert!(roost
            .forwarder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none());

        // Writes still succeed; nothing forwards them.
        roost.group(group).create_todo(home, "x").await.unwrap();
        assert_eq!(updates.next().await, Update::Finished);
        assert_eq!(updates.next().await, Update::Finished);
    }
}
