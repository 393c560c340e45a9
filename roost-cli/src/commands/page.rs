//! Page backwards through a synthetic message history.

use anyhow::{Context, Result};
use roost_client::{RoostConfig, Store};
use roost_types::{now, ItemId, Message, Record, WriteBatch};
use serde::Serialize;

use super::{print_json, scratch};

/// One fetched page.
#[derive(Debug, Serialize)]
pub struct PageSummary {
    /// Messages on the page.
    pub count: usize,
    /// Newest timestamp on the page.
    pub newest: Option<f64>,
    /// Oldest timestamp on the page.
    pub oldest: Option<f64>,
    /// Cursor for the next page, empty when there is none.
    pub cursor: String,
    /// Whether paging stopped here.
    pub at_end: bool,
}

/// Everything the command did.
#[derive(Debug, Serialize)]
pub struct PageReport {
    /// Messages created.
    pub messages: usize,
    /// Configured page size.
    pub page_size: usize,
    /// Pages in fetch order.
    pub pages: Vec<PageSummary>,
}

/// Write `messages` messages one second apart, then page until the end.
pub async fn execute(config: &RoostConfig, messages: usize) -> Result<PageReport> {
    let (roost, group, home) = scratch(config).await?;

    // Spaced timestamps keep every message on exactly one page.
    let start = now().floor() - messages as f64;
    let mut batch = WriteBatch::new();
    for i in 0..messages {
        let created_at = start + i as f64;
        batch.insert(Record::Message(Message {
            id: ItemId::new(),
            group_id: group,
            topic_id: home,
            created_at,
            modified_at: created_at,
            body: format!("message {}", i + 1),
        }));
    }
    roost
        .store()
        .write(batch)
        .await
        .context("Failed to write messages")?;

    let group = roost.group(group);
    let mut pages = Vec::new();
    let mut cursor = String::new();
    loop {
        let page = group
            .messages(home, &cursor)
            .await
            .with_context(|| format!("Failed to fetch page after cursor {:?}", cursor))?;
        cursor = page.cursor_token();
        pages.push(PageSummary {
            count: page.items.len(),
            newest: page.items.first().map(|m| m.created_at),
            oldest: page.items.last().map(|m| m.created_at),
            cursor: cursor.clone(),
            at_end: page.at_end,
        });
        if page.at_end {
            break;
        }
    }

    Ok(PageReport {
        messages,
        page_size: config.paging.messages_page_size,
        pages,
    })
}

/// Run the page command.
pub async fn run(config: &RoostConfig, json: bool, messages: usize) -> Result<()> {
    let report = execute(config, messages).await?;
    if json {
        return print_json(&report);
    }

    println!(
        "{} messages, {} per page",
        report.messages, report.page_size
    );
    for (i, page) in report.pages.iter().enumerate() {
        let end = if page.at_end { " (end)" } else { "" };
        match (page.newest, page.oldest) {
            (Some(newest), Some(oldest)) => println!(
                "Page {}: {} messages, {} .. {}{}",
                i + 1,
                page.count,
                newest,
                oldest,
                end
            ),
            _ => println!("Page {}: empty{}", i + 1, end),
        }
    }
    Ok(())
}
