//! CLI command implementations.
//!
//! Every command runs against a fresh [`MemoryStore`] holding one group.

pub mod page;
pub mod reorder;
pub mod search;
pub mod watch;

use anyhow::{Context, Result};
use roost_client::{MemoryStore, Roost, RoostConfig};
use roost_types::{GroupId, ItemId};
use serde::Serialize;

/// A client over an empty store with one group, plus that group's home
/// topic.
pub async fn scratch(config: &RoostConfig) -> Result<(Roost<MemoryStore>, GroupId, ItemId)> {
    let roost =
        Roost::new(MemoryStore::new(), config.clone()).context("Failed to create client")?;
    let group = roost
        .create_group("scratch")
        .await
        .context("Failed to create group")?;
    let home = roost
        .group(group)
        .topics(false)
        .await?
        .first()
        .map(|topic| topic.id)
        .context("New group has no home topic")?;
    Ok((roost, group, home))
}

/// Pretty-print `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
