//! Ordered lists and the categories that partition them.
//!
//! A container (a group for topics, a topic for todos) splits its members
//! into independently ordered sub-lists. [`ListSelector`] names exactly one
//! of those sub-lists so the reorder algorithm never has to know which
//! entity kind it is working on.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypeError;
use crate::ids::{GroupId, ItemId};

/// The kind of row stored by the storage collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A group.
    Group,
    /// A topic within a group.
    Topic,
    /// A todo item within a topic.
    Todo,
    /// A chat message within a topic.
    Message,
    /// A reaction attached to another row.
    Reaction,
}

impl EntityKind {
    /// The view name used in change notifications (`topics`, `todos`, ...).
    pub fn view_name(&self) -> &'static str {
        match self {
            EntityKind::Group => "groups",
            EntityKind::Topic => "topics",
            EntityKind::Todo => "todos",
            EntityKind::Message => "messages",
            EntityKind::Reaction => "reactions",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.view_name())
    }
}

/// The partition of a container a list member belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Topics pinned to the top of a group.
    Pinned,
    /// All other topics.
    Unpinned,
    /// Open todo items.
    Incomplete,
    /// Completed todo items.
    Complete,
}

impl Category {
    /// The field holding a member's position within this category.
    pub fn position_field(&self) -> PositionField {
        match self {
            Category::Pinned => PositionField::PinPosition,
            Category::Unpinned | Category::Incomplete => PositionField::Position,
            Category::Complete => PositionField::CompletedPosition,
        }
    }

    /// The entity kind that lives in lists of this category.
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Category::Pinned | Category::Unpinned => EntityKind::Topic,
            Category::Incomplete | Category::Complete => EntityKind::Todo,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Pinned => "pinned",
            Category::Unpinned => "unpinned",
            Category::Incomplete => "incomplete",
            Category::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Which position column a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionField {
    /// `position` (unpinned topics, incomplete todos).
    Position,
    /// `pin_position` (pinned topics).
    PinPosition,
    /// `completed_position` (complete todos).
    CompletedPosition,
}

/// The owner of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerId {
    /// A group; its members are topics.
    Group(GroupId),
    /// A topic inside a group; its members are todos.
    Topic(GroupId, ItemId),
}

impl ContainerId {
    /// The group the container belongs to.
    pub fn group_id(&self) -> GroupId {
        match *self {
            ContainerId::Group(group) | ContainerId::Topic(group, _) => group,
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerId::Group(group) => write!(f, "group {}", group),
            ContainerId::Topic(_, topic) => write!(f, "topic {}", topic),
        }
    }
}

/// Selects one independently ordered list: `{container, category}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListSelector {
    container: ContainerId,
    category: Category,
}

impl ListSelector {
    /// Build a selector, checking that the category fits the container.
    pub fn new(container: ContainerId, category: Category) -> Result<Self, TypeError> {
        let fits = matches!(
            (container, category.entity_kind()),
            (ContainerId::Group(_), EntityKind::Topic) | (ContainerId::Topic(..), EntityKind::Todo)
        );
        if !fits {
            return Err(TypeError::CategoryMismatch {
                category: category.to_string(),
                container: container.to_string(),
            });
        }
        Ok(Self {
            container,
            category,
        })
    }

    /// The pinned or unpinned topics of a group.
    pub fn topics(group: GroupId, pinned: bool) -> Self {
        let category = if pinned {
            Category::Pinned
        } else {
            Category::Unpinned
        };
        Self {
            container: ContainerId::Group(group),
            category,
        }
    }

    /// The complete or incomplete todos of a topic.
    pub fn todos(group: GroupId, topic: ItemId, complete: bool) -> Self {
        let category = if complete {
            Category::Complete
        } else {
            Category::Incomplete
        };
        Self {
            container: ContainerId::Topic(group, topic),
            category,
        }
    }

    /// The owning container.
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// The category within the container.
    pub fn category(&self) -> Category {
        self.category
    }

    /// The group every member of this list belongs to.
    pub fn group_id(&self) -> GroupId {
        self.container.group_id()
    }

    /// The position field members of this list are ordered by.
    pub fn position_field(&self) -> PositionField {
        self.category.position_field()
    }
}

impl fmt::Display for ListSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.container, self.category)
    }
}
