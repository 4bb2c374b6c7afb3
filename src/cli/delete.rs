use anyhow::Result;

use crate::cli::IdArgs;
use crate::notebook::Notebook;

/// Execute the delete command
pub async fn run_delete(notebook: &Notebook, args: &IdArgs) -> Result<()> {
    notebook.notes.load().await?;

    let title = notebook.notes.get(args.id).map(|n| n.title);
    if notebook.notes.delete(args.id).await? {
        println!("Deleted #{}: {}", args.id, title.unwrap_or_default());
    } else {
        println!("No note with ID {}.", args.id);
    }
    Ok(())
}
