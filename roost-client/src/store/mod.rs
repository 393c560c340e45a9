//! The storage collaborator.
//!
//! [`Store`] is everything Roost needs from persistence: list reads, atomic
//! batched writes, change subscriptions and text search. All I/O and
//! network framing belong behind this trait.

mod memory;
mod snippet;

pub use memory::MemoryStore;

use async_trait::async_trait;
use roost_types::{
    ChangeSet, EntityKind, Group, GroupId, ItemId, ListEntry, ListSelector, Message, Reaction,
    Record, SearchHit, SearchScope, Topic, TopicCounts, WriteBatch,
};
use thiserror::Error;
use tokio::sync::mpsc;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or failed mid-operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend refused a write; nothing was applied.
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Trait for storage backends.
#[async_trait]
pub trait Store: Send + Sync {
    /// Every current member of `list`, in no particular order.
    async fn list_records(&self, list: &ListSelector) -> Result<Vec<Record>, StoreError>;

    /// The members of `list` as `(id, position)` entries in list order.
    async fn read_list(&self, list: &ListSelector) -> Result<Vec<ListEntry>, StoreError> {
        let records = self.list_records(list).await?;
        let mut entries: Vec<ListEntry> = records
            .iter()
            .filter_map(|record| {
                let position = record.position_in(list)?;
                Some(ListEntry {
                    id: record.item_id()?,
                    position,
                    created_at: record.created_at(),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.list_order(b));
        Ok(entries)
    }

    /// Apply every op in `batch`, or none of them.
    async fn write(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Look up a row by id.
    async fn record(&self, id: ItemId) -> Result<Option<Record>, StoreError>;

    /// Look up a group by id.
    async fn group(&self, id: GroupId) -> Result<Option<Group>, StoreError>;

    /// Every group, oldest first.
    async fn groups(&self) -> Result<Vec<Group>, StoreError>;

    /// Unread messages, incomplete todos and unread todos of `topic`.
    ///
    /// Messages count as unread when created after the given topic's
    /// `message_last_read`. Deleted todos are never counted.
    async fn topic_counts(&self, topic: &Topic) -> Result<TopicCounts, StoreError>;

    /// Messages of a topic created strictly before `before` (all when
    /// `None`), newest first, at most `limit`.
    async fn messages(
        &self,
        group: GroupId,
        topic: ItemId,
        before: Option<f64>,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError>;

    /// The reaction with this rune on `entity`, active or not.
    async fn reaction(
        &self,
        group: GroupId,
        entity: ItemId,
        rune: &str,
    ) -> Result<Option<Reaction>, StoreError>;

    /// Every reaction on `entity`, active or not.
    async fn reactions(&self, group: GroupId, entity: ItemId) -> Result<Vec<Reaction>, StoreError>;

    /// Matches for `scope`, most relevant first, skipping `offset`.
    async fn search_text(
        &self,
        scope: &SearchScope,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<SearchHit>, StoreError>;

    /// Total matches for `scope` right now.
    async fn count_matches(&self, scope: &SearchScope) -> Result<usize, StoreError>;

    /// Receive a [`ChangeSet`] for every committed write touching `kinds`.
    ///
    /// Only changes of the given kinds are included; a write touching none
    /// of them sends nothing.
    fn subscribe(&self, kinds: &[EntityKind]) -> mpsc::UnboundedReceiver<ChangeSet>;
}
