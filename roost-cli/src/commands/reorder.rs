//! Apply moves to a fresh todo list.

use anyhow::{Context, Result};
use roost_client::{MemoryStore, RoostConfig, RoostGroup};
use roost_types::ItemId;
use serde::Serialize;

use super::{print_json, scratch};

/// One `FROM:TO` move argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// Current index.
    pub from: usize,
    /// Destination index.
    pub to: usize,
}

/// Parse `FROM:TO`.
pub fn parse_move(arg: &str) -> Result<Move, String> {
    let (from, to) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got {:?}", arg))?;
    let from = from
        .trim()
        .parse()
        .map_err(|e| format!("invalid FROM index {:?}: {}", from, e))?;
    let to = to
        .trim()
        .parse()
        .map_err(|e| format!("invalid TO index {:?}: {}", to, e))?;
    Ok(Move { from, to })
}

/// One applied move and the list it left behind.
#[derive(Debug, Serialize)]
pub struct MoveStep {
    /// Source index.
    pub from: usize,
    /// Destination index.
    pub to: usize,
    /// Position before the move.
    pub previous: f64,
    /// Position after the move.
    pub position: f64,
    /// Whether all-zero positions were repaired first.
    pub repaired: bool,
    /// Todo bodies in list order after the move.
    pub order: Vec<String>,
}

/// Everything the command did.
#[derive(Debug, Serialize)]
pub struct ReorderReport {
    /// Todo bodies before any move.
    pub initial: Vec<String>,
    /// Moves in the order applied.
    pub steps: Vec<MoveStep>,
}

/// Create todos `1..=items` and apply `moves` in order.
pub async fn execute(config: &RoostConfig, items: usize, moves: &[Move]) -> Result<ReorderReport> {
    let (roost, group, home) = scratch(config).await?;
    let group = roost.group(group);

    for i in 1..=items {
        group
            .create_todo(home, &i.to_string())
            .await
            .context("Failed to create todo")?;
    }
    let initial = bodies(&group, home).await?;

    let mut steps = Vec::with_capacity(moves.len());
    for m in moves {
        let plan = group
            .move_todo(home, false, m.from, m.to)
            .await
            .with_context(|| format!("Move {}:{} failed", m.from, m.to))?;
        steps.push(MoveStep {
            from: m.from,
            to: m.to,
            previous: plan.previous,
            position: plan.moved.position,
            repaired: plan.repaired(),
            order: bodies(&group, home).await?,
        });
    }

    Ok(ReorderReport { initial, steps })
}

/// Run the reorder command.
pub async fn run(config: &RoostConfig, json: bool, items: usize, moves: &[Move]) -> Result<()> {
    let report = execute(config, items, moves).await?;
    if json {
        return print_json(&report);
    }

    println!("Initial: {}", report.initial.join(" "));
    for step in &report.steps {
        println!("Move {} -> {}: {}", step.from, step.to, step.order.join(" "));
        println!(
            "  position {} -> {}{}",
            step.previous,
            step.position,
            if step.repaired {
                " (zero positions repaired)"
            } else {
                ""
            }
        );
    }
    Ok(())
}

async fn bodies(group: &RoostGroup<'_, MemoryStore>, topic: ItemId) -> Result<Vec<String>> {
    Ok(group
        .todos(topic, false)
        .await
        .context("Failed to read todos")?
        .into_iter()
        .map(|todo| todo.body)
        .collect())
}
