//! Search a set of todos page by page.

use anyhow::{Context, Result};
use roost_client::RoostConfig;
use roost_core::SearchResults;
use roost_types::SearchHit;
use serde::Serialize;

use super::{print_json, scratch};

const SAMPLE_TODOS: &[&str] = &[
    "mow the lawn",
    "buy lawn seed",
    "call the plumber about the kitchen sink",
    "fix the lawn mower before the weekend",
    "book the dentist",
];

/// Everything the command did.
#[derive(Debug, Serialize)]
pub struct SearchReport {
    /// The term searched for.
    pub term: String,
    /// Match count reported with the first page.
    pub total: usize,
    /// Result count of each page fetched.
    pub pages: Vec<usize>,
    /// Every hit, most relevant first.
    pub hits: Vec<SearchHit>,
}

/// Create `todos` (or a sample list) and fetch every page of `term`.
pub async fn execute(config: &RoostConfig, term: &str, todos: &[String]) -> Result<SearchReport> {
    let (roost, group, home) = scratch(config).await?;
    let handle = roost.group(group);

    let bodies: Vec<&str> = if todos.is_empty() {
        SAMPLE_TODOS.to_vec()
    } else {
        todos.iter().map(String::as_str).collect()
    };
    for body in bodies {
        handle
            .create_todo(home, body)
            .await
            .context("Failed to create todo")?;
    }

    let page_size = config.paging.search_page_size;
    let mut page: SearchResults = handle
        .search(term, "[", "]")
        .await
        .with_context(|| format!("Search for {:?} failed", term))?;
    let total = page.total;
    let mut pages = Vec::new();
    let mut hits = Vec::new();
    loop {
        pages.push(page.count);
        let last = page.is_last_page(page_size);
        hits.append(&mut page.results);
        if last {
            break;
        }
        page = roost
            .next_page(&page)
            .await
            .context("Failed to fetch next search page")?;
    }

    Ok(SearchReport {
        term: term.to_string(),
        total,
        pages,
        hits,
    })
}

/// Run the search command.
pub async fn run(config: &RoostConfig, json: bool, term: &str, todos: &[String]) -> Result<()> {
    let report = execute(config, term, todos).await?;
    if json {
        return print_json(&report);
    }

    println!(
        "{} matches for {:?} over {} page(s)",
        report.total,
        report.term,
        report.pages.len()
    );
    for hit in &report.hits {
        println!("  [{:?} in {}] {}", hit.kind, hit.topic_name, hit.text);
    }
    Ok(())
}
