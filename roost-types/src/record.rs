//! Entity records as exchanged with the storage collaborator.
//!
//! Times are seconds since the Unix epoch (see [`crate::now`]).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::AddAssign;

use crate::ids::{GroupId, ItemId};
use crate::list::{Category, ContainerId, EntityKind, ListSelector};

/// A group: the unit of sharing between members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Group identifier.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Creation time.
    pub created_at: f64,
}

/// An organisational structure within a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    /// Topic identifier.
    pub id: ItemId,
    /// Owning group.
    pub group_id: GroupId,
    /// Creation time.
    pub created_at: f64,
    /// Last modification time.
    pub modified_at: f64,
    /// Display label.
    pub label: String,
    /// Time the local member last read the topic's messages.
    pub message_last_read: f64,
    /// Whether completed todos are shown.
    pub show_completed: bool,
    /// Whether the topic lives in the pinned list.
    pub pinned: bool,
    /// Position within the unpinned list.
    pub position: f64,
    /// Position within the pinned list.
    pub pin_position: f64,
}

/// A todo item within a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    /// Todo identifier.
    pub id: ItemId,
    /// Owning group.
    pub group_id: GroupId,
    /// Owning topic.
    pub topic_id: ItemId,
    /// Creation time.
    pub created_at: f64,
    /// Last modification time.
    pub modified_at: f64,
    /// Text body.
    pub body: String,
    /// Completion time, `0.0` while incomplete.
    pub completed_at: f64,
    /// Position within the complete list.
    pub completed_position: f64,
    /// Soft-delete flag.
    pub deleted: bool,
    /// Whether the local member has seen this todo.
    pub read: bool,
    /// Position within the incomplete list.
    pub position: f64,
}

impl Todo {
    /// Whether the todo has been completed.
    pub fn is_complete(&self) -> bool {
        self.completed_at != 0.0
    }
}

/// A chat message sent within a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier.
    pub id: ItemId,
    /// Owning group.
    pub group_id: GroupId,
    /// Owning topic.
    pub topic_id: ItemId,
    /// Creation time; the paging key.
    pub created_at: f64,
    /// Last modification time.
    pub modified_at: f64,
    /// Text body.
    pub body: String,
}

/// A single-grapheme marker attached to another row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Reaction identifier.
    pub id: ItemId,
    /// Owning group.
    pub group_id: GroupId,
    /// The row reacted to.
    pub entity_id: ItemId,
    /// Creation time.
    pub created_at: f64,
    /// Last modification time.
    pub modified_at: f64,
    /// The marker itself, exactly one grapheme cluster.
    pub rune: String,
    /// Whether the reaction is currently set.
    pub active: bool,
}

/// Any row the storage collaborator holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    /// A group row.
    Group(Group),
    /// A topic row.
    Topic(Topic),
    /// A todo row.
    Todo(Todo),
    /// A message row.
    Message(Message),
    /// A reaction row.
    Reaction(Reaction),
}

impl Record {
    /// The kind of row.
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Group(_) => EntityKind::Group,
            Record::Topic(_) => EntityKind::Topic,
            Record::Todo(_) => EntityKind::Todo,
            Record::Message(_) => EntityKind::Message,
            Record::Reaction(_) => EntityKind::Reaction,
        }
    }

    /// Row identity; groups are keyed by [`GroupId`] instead.
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            Record::Group(_) => None,
            Record::Topic(t) => Some(t.id),
            Record::Todo(t) => Some(t.id),
            Record::Message(m) => Some(m.id),
            Record::Reaction(r) => Some(r.id),
        }
    }

    /// The group the row belongs to.
    pub fn group_id(&self) -> GroupId {
        match self {
            Record::Group(g) => g.id,
            Record::Topic(t) => t.group_id,
            Record::Todo(t) => t.group_id,
            Record::Message(m) => m.group_id,
            Record::Reaction(r) => r.group_id,
        }
    }

    /// Creation time of the row.
    pub fn created_at(&self) -> f64 {
        match self {
            Record::Group(g) => g.created_at,
            Record::Topic(t) => t.created_at,
            Record::Todo(t) => t.created_at,
            Record::Message(m) => m.created_at,
            Record::Reaction(r) => r.created_at,
        }
    }

    /// Position of the row within `list`, or `None` if it is not a member.
    pub fn position_in(&self, list: &ListSelector) -> Option<f64> {
        match (self, list.container(), list.category()) {
            (Record::Topic(t), ContainerId::Group(group), category) if t.group_id == group => {
                match category {
                    Category::Pinned if t.pinned => Some(t.pin_position),
                    Category::Unpinned if !t.pinned => Some(t.position),
                    _ => None,
                }
            }
            (Record::Todo(t), ContainerId::Topic(group, topic), category)
                if t.group_id == group && t.topic_id == topic && !t.deleted =>
            {
                match category {
                    Category::Complete if t.is_complete() => Some(t.completed_position),
                    Category::Incomplete if !t.is_complete() => Some(t.position),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Unread and open-work tallies of a topic, or summed over a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCounts {
    /// Messages created after the topic's `message_last_read`.
    pub unread_messages: usize,
    /// Non-deleted todos not yet completed.
    pub incomplete_todos: usize,
    /// Non-deleted todos the local member has not seen.
    pub unread_todos: usize,
}

impl AddAssign for TopicCounts {
    fn add_assign(&mut self, other: Self) {
        self.unread_messages += other.unread_messages;
        self.incomplete_todos += other.incomplete_todos;
        self.unread_todos += other.unread_todos;
    }
}

/// A topic together with its counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    /// The topic row.
    #[serde(flatten)]
    pub topic: Topic,
    /// Counts for the topic.
    #[serde(flatten)]
    pub counts: TopicCounts,
}

/// A group together with the counts of all its topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// The group row.
    #[serde(flatten)]
    pub group: Group,
    /// Sum over every pinned and unpinned topic.
    #[serde(flatten)]
    pub counts: TopicCounts,
}

/// One member of an ordered list as seen by the reorder algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    /// Member identifier.
    pub id: ItemId,
    /// Position within the list's category.
    pub position: f64,
    /// Creation time, the first tie-break.
    pub created_at: f64,
}

impl ListEntry {
    /// Total list order: position, then creation time, then identity.
    pub fn list_order(&self, other: &Self) -> Ordering {
        self.position
            .total_cmp(&other.position)
            .then_with(|| self.created_at.total_cmp(&other.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}
