//! Print the live-update stream while todos are written.

use anyhow::{Context, Result};
use roost_client::RoostConfig;
use roost_types::Update;

use super::{print_json, scratch};

/// Start a client, create `todos` todos, complete the first and shut down.
///
/// Returns every update the reader saw, ending with [`Update::Finished`].
pub async fn execute(config: &RoostConfig, todos: usize) -> Result<Vec<Update>> {
    let (roost, group, home) = scratch(config).await?;
    let mut updates = roost.updates().context("Update stream already taken")?;

    let reader = tokio::spawn(async move {
        let mut seen = Vec::new();
        loop {
            let update = updates.next().await;
            let finished = update.is_finished();
            seen.push(update);
            if finished {
                return seen;
            }
        }
    });

    roost.start().await.context("Failed to start client")?;

    let handle = roost.group(group);
    let mut first = None;
    for i in 1..=todos {
        let id = handle
            .create_todo(home, &format!("todo {}", i))
            .await
            .context("Failed to create todo")?;
        if first.is_none() {
            first = Some(id);
        }
    }
    if let Some(id) = first {
        let mut batch = roost.todo_batch();
        batch.mark_complete(id, true);
        roost
            .commit_todos(batch)
            .await
            .context("Failed to complete todo")?;
    }

    roost.shutdown().await.context("Failed to shut down")?;
    reader.await.context("Update reader failed")
}

/// Run the watch command.
pub async fn run(config: &RoostConfig, json: bool, todos: usize) -> Result<()> {
    let seen = execute(config, todos).await?;
    if json {
        return print_json(&seen);
    }

    for update in &seen {
        println!("{}", describe(update));
    }
    Ok(())
}

fn describe(update: &Update) -> String {
    match update {
        Update::AppState(state) => format!("app state: {:?}", state),
        Update::Group(group) => format!("group {}: {} members", group.id, group.member_count),
        Update::View(view) => format!("view: {}", view.view),
        Update::Entity(entity) => format!("entity: {} {}", entity.view, entity.entity_id),
        Update::Intro(intro) => format!("intro: group {} stage {}", intro.group_id, intro.stage),
        Update::Transport(transport) => format!("transport {}: {}", transport.url, transport.state),
        Update::MessagesFetched => "messages fetched".to_string(),
        Update::Finished => "finished".to_string(),
    }
}
