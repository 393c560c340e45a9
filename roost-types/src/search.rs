//! Full-text search request and result types.

use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, ItemId};

/// What to search and how to mark matches in snippets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchScope {
    /// Group to search within.
    pub group_id: GroupId,
    /// Search term.
    pub term: String,
    /// Inserted before each match in a snippet.
    pub highlight_start: String,
    /// Inserted after each match in a snippet.
    pub highlight_end: String,
}

/// Which kind of row a hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchHitKind {
    /// A todo body.
    Todo,
    /// A message body.
    Message,
}

/// One search hit, in relevance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The matching row.
    pub entity_id: ItemId,
    /// Its group.
    pub group_id: GroupId,
    /// The topic the row lives in.
    pub topic_id: ItemId,
    /// That topic's label at query time.
    pub topic_name: String,
    /// Row kind.
    pub kind: SearchHitKind,
    /// Snippet with matches wrapped in the highlight markers.
    pub text: String,
}
