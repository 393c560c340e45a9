//! Live-update events.
//!
//! Every change the application can observe is one variant of [`Update`].
//! Consumers match exhaustively, so adding a kind is a compile error at
//! every reader until it is handled.

use serde::{Deserialize, Serialize};

use crate::ids::{GroupId, ItemId};
use crate::list::EntityKind;

/// Application lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppState {
    /// Never initialised.
    New,
    /// Initialised but not unlocked.
    Locked,
    /// Unlocked and running.
    Running,
}

/// Membership and sync state of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupUpdate {
    /// Group the update is about.
    pub id: GroupId,
    /// Members that acknowledged the latest state.
    pub acked_member_count: u32,
    /// Opaque group state code from the sync layer.
    pub group_state: u32,
    /// Total members.
    pub member_count: u32,
    /// Members currently connected.
    pub connected_member_count: u32,
    /// Sync sequence number.
    pub seq: u64,
    /// Messages not yet delivered to every member.
    pub pending_message_count: u32,
}

/// A view (all rows of one kind) changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewUpdate {
    /// The view that changed.
    pub view: EntityKind,
}

/// A single row changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityUpdate {
    /// The view the row belongs to.
    pub view: EntityKind,
    /// The row's group.
    pub group_id: GroupId,
    /// The row.
    pub entity_id: ItemId,
}

/// Progress of a pairing/introduction exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroUpdate {
    /// Group being joined.
    pub group_id: GroupId,
    /// Whether this device started the exchange.
    pub initiator: bool,
    /// Protocol stage.
    pub stage: u32,
    /// Exchange type (invite or device link).
    pub kind: u32,
}

/// Connectivity of one transport endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportStateUpdate {
    /// Endpoint URL.
    pub url: String,
    /// Human-readable state.
    pub state: String,
}

/// The closed set of events delivered by the update stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "update", rename_all = "snake_case")]
pub enum Update {
    /// Application lifecycle changed.
    AppState(AppState),
    /// Group membership or sync state changed.
    Group(GroupUpdate),
    /// A view changed.
    View(ViewUpdate),
    /// A row changed.
    Entity(EntityUpdate),
    /// Pairing/introduction progressed.
    Intro(IntroUpdate),
    /// Transport connectivity changed.
    Transport(TransportStateUpdate),
    /// A bulk message fetch completed.
    MessagesFetched,
    /// No more events will follow.
    Finished,
}

/// Discriminant of an [`Update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// [`Update::AppState`]
    AppState,
    /// [`Update::Group`]
    Group,
    /// [`Update::View`]
    View,
    /// [`Update::Entity`]
    Entity,
    /// [`Update::Intro`]
    Intro,
    /// [`Update::Transport`]
    Transport,
    /// [`Update::MessagesFetched`]
    MessagesFetched,
    /// [`Update::Finished`]
    Finished,
}

impl Update {
    /// The discriminant of this update.
    pub fn kind(&self) -> UpdateKind {
        match self {
            Update::AppState(_) => UpdateKind::AppState,
            Update::Group(_) => UpdateKind::Group,
            Update::View(_) => UpdateKind::View,
            Update::Entity(_) => UpdateKind::Entity,
            Update::Intro(_) => UpdateKind::Intro,
            Update::Transport(_) => UpdateKind::Transport,
            Update::MessagesFetched => UpdateKind::MessagesFetched,
            Update::Finished => UpdateKind::Finished,
        }
    }

    /// Whether this is the terminal marker.
    pub fn is_finished(&self) -> bool {
        matches!(self, Update::Finished)
    }
}

/// One row touched by a committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowChange {
    /// Row kind.
    pub kind: EntityKind,
    /// Row group.
    pub group_id: GroupId,
    /// Row id.
    pub id: ItemId,
}

/// All rows touched by one committed [`crate::WriteBatch`], in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Touched rows; a row appears once even if several fields changed.
    pub changes: Vec<RowChange>,
}

impl ChangeSet {
    /// Distinct kinds touched, in first-touched order.
    pub fn kinds(&self) -> Vec<EntityKind> {
        let mut kinds = Vec::new();
        for change in &self.changes {
            if !kinds.contains(&change.kind) {
                kinds.push(change.kind);
            }
        }
        kinds
    }
}
