//! Plain-text reports returned by the tools.
//!
//! Line order is fixed; MCP clients and the humans reading their
//! transcripts rely on it.

use ado_client::ItemRecord;

/// Full report for `get_work_item`.
#[must_use]
pub fn work_item_report(item: &ItemRecord) -> String {
    let mut lines = vec![
        format!("Work Item #{}: {}", item.id, item.title),
        format!("Type: {}", item.work_item_type),
        format!("State: {}", item.state),
        format!("Assigned To: {}", item.assigned_to),
        format!("Created: {} by {}", item.created_date, item.created_by),
        format!("Last Changed: {}", item.changed_date),
        format!("Area Path: {}", item.area_path),
        format!("Iteration: {}", item.iteration_path),
    ];

    if !item.tags.is_empty() {
        lines.push(format!("Tags: {}", item.tags));
    }

    lines.push("\n--- Description ---".to_string());
    lines.push(if item.description.is_empty() {
        "No description".to_string()
    } else {
        item.description.clone()
    });

    if let Some(steps) = item.steps_to_reproduce.as_deref().filter(|s| !s.is_empty()) {
        lines.push("\n--- Steps to Reproduce ---".to_string());
        lines.push(steps.to_string());
    }

    if item.comment_count() > 0 {
        lines.push(format!("\n--- Comments ({}) ---", item.comment_count()));
        for (index, comment) in item.comments.iter().enumerate() {
            lines.push(format!(
                "\nComment {} by {} on {}:",
                index + 1,
                comment.created_by,
                comment.created_date
            ));
            lines.push(comment.text.clone());
        }
    } else {
        lines.push("\n--- Comments ---".to_string());
        lines.push("No comments".to_string());
    }

    lines.join("\n")
}

/// Confirmation for `update_work_item_status`.
///
/// The state line shows only the state read back after the update; the
/// previous state is not fetched.
#[must_use]
pub fn status_update_report(work_item_id: i64, item: &ItemRecord) -> String {
    [
        format!("Successfully updated work item #{work_item_id}"),
        format!("Title: {}", item.title),
        format!("Previous State -> New State: {}", item.state),
        format!("Type: {}", item.work_item_type),
        format!("Assigned To: {}", item.assigned_to),
    ]
    .join("\n")
}
