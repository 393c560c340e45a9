//! # roost-core
//!
//! Pure logic for Roost (no I/O, instant tests).
//!
//! This crate implements the ordering, paging and batching algorithms
//! without touching storage, enabling fast deterministic unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take the current state
//! read from storage and produce the writes or pages to hand back:
//! - [`position`] allocates fractional ordering keys
//! - [`reorder`] turns a move request into position writes
//! - [`paging`] builds cursor pages over creation timestamps
//! - [`search`] tracks offset paging over relevance-ordered results
//! - [`batch`] accumulates todo completion/read edits for one commit
//! - [`reaction`] validates reaction markers
//!
//! Reading and writing is performed by `roost-client`, which feeds these
//! functions and submits their output to the storage collaborator.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod error;
pub mod paging;
pub mod position;
pub mod reaction;
pub mod reorder;
pub mod search;

pub use batch::TodoBatch;
pub use error::CoreError;
pub use paging::{paginate, Chronological, Page, PageCursor, MESSAGES_PAGE_SIZE};
pub use position::{allocate, allocate_with, append_position, append_position_with};
pub use reaction::validate_rune;
pub use reorder::{plan_move, plan_move_with, MovePlan};
pub use search::{SearchResults, SEARCH_PAGE_SIZE};
