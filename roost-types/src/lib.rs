//! # roost-types
//!
//! Shared value types for Roost, the collaborative topic/todo/chat core.
//!
//! This crate provides the foundational types used across all Roost crates:
//! - [`GroupId`], [`ItemId`] - Identity types
//! - [`ListSelector`], [`Category`] - The independently ordered lists of a container
//! - [`Record`] and its entities ([`Topic`], [`Todo`], [`Message`], [`Reaction`])
//! - [`WriteBatch`] - Atomic multi-field mutations handed to storage
//! - [`Update`] - The closed set of live-update events
//! - [`TypeError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod list;
mod record;
mod search;
mod time;
mod update;
mod write;

pub use error::TypeError;
pub use ids::{GroupId, ItemId};
pub use list::{Category, ContainerId, EntityKind, ListSelector, PositionField};
pub use record::{
    Group, GroupSummary, ListEntry, Message, Reaction, Record, Todo, Topic, TopicCounts,
    TopicSummary,
};
pub use search::{SearchHit, SearchHitKind, SearchScope};
pub use time::now;
pub use update::{
    AppState, ChangeSet, EntityUpdate, GroupUpdate, IntroUpdate, RowChange, TransportStateUpdate,
    Update, UpdateKind, ViewUpdate,
};
pub use write::{FieldChange, FieldWrite, PositionWrite, WriteBatch, WriteOp};
