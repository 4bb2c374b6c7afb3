use anyhow::{anyhow, Result};
use chrono::FixedOffset;

use crate::cli::display::parse_deadline;
use crate::cli::AddArgs;
use crate::notebook::Notebook;

/// Execute the add command
pub async fn run_add(notebook: &Notebook, args: &AddArgs, offset: FixedOffset) -> Result<()> {
    let deadline = match args.deadline.as_deref() {
        Some(input) => Some(
            parse_deadline(input, offset)
                .ok_or_else(|| anyhow!("Could not parse deadline '{}'. Try YYYY-MM-DD HH:MM.", input))?,
        ),
        None => None,
    };

    notebook.notes.load().await?;
    match notebook.notes.create(&args.title, args.section, deadline).await? {
        Some(note) => println!(
            "Added #{} to {} at position {}.",
            note.id,
            note.section.label(),
            note.position + 1
        ),
        None => println!("Title must be non-blank and at most 2000 characters. Nothing added."),
    }
    Ok(())
}
