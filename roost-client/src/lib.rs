//! # roost-client
//!
//! Application layer for Roost, the collaborative topic/todo/chat core.
//!
//! This is the library applications embed to order, page and search their
//! data and to observe changes live.
//!
//! ## Features
//!
//! - **Fractional ordering**: moves write one position, never renumber
//! - **Storage abstraction**: pluggable [`Store`] (in-memory for tests)
//! - **Live updates**: one bounded, ordered stream fed by many producers
//! - **Pure core**: ordering and paging logic lives in `roost-core`
//!
//! ## Example
//!
//! ```ignore
//! use roost_client::{MemoryStore, Roost, RoostConfig};
//!
//! let roost = Roost::new(MemoryStore::new(), RoostConfig::default())?;
//! let mut updates = roost.updates().expect("first call");
//! roost.start().await?;
//!
//! let group = roost.group(roost.create_group("family").await?);
//! let home = group.topics(false).await?[0].id;
//! group.create_todo(home, "mow the lawn").await?;
//!
//! let page = group.messages(home, "").await?;
//! let hits = group.search("lawn", "<b>", "</b>").await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod store;
pub mod updates;

pub use client::{MessagePage, Roost, RoostGroup, HOME_TOPIC};
pub use config::{ConfigError, LoggingConfig, PagingConfig, RoostConfig, UpdatesConfig};
pub use error::ClientError;
pub use store::{MemoryStore, Store, StoreError};
pub use updates::{channel, UpdateError, UpdateSender, Updates, DEFAULT_CHANNEL_CAPACITY};
