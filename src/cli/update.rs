use anyhow::{anyhow, Result};
use chrono::FixedOffset;

use crate::cli::display::parse_deadline;
use crate::cli::{EditArgs, IdArgs, MoveArgs};
use crate::models::NotePatch;
use crate::notebook::Notebook;

/// Execute the edit command
pub async fn run_edit(notebook: &Notebook, args: &EditArgs, offset: FixedOffset) -> Result<()> {
    let patch = edit_patch(args, offset)?;
    if patch.is_empty() {
        println!("Nothing to change. Pass --title, --section, --deadline or --clear-deadline.");
        return Ok(());
    }

    notebook.notes.load().await?;
    if notebook.notes.get(args.id).is_none() {
        println!("No note with ID {}.", args.id);
        return Ok(());
    }

    let note = notebook.notes.update(args.id, patch).await?;
    if args.title.is_some() && note.title != args.title.as_deref().unwrap_or_default() {
        println!("Title must be non-blank and at most 2000 characters; kept the old one.");
    }
    println!("Updated #{} ({}).", note.id, note.section.label());
    Ok(())
}

fn edit_patch(args: &EditArgs, offset: FixedOffset) -> Result<NotePatch> {
    let mut patch = NotePatch::default();
    if let Some(title) = &args.title {
        patch = patch.title(title.as_str());
    }
    if let Some(section) = args.section {
        patch = patch.section(section);
    }
    if let Some(input) = args.deadline.as_deref() {
        let due = parse_deadline(input, offset)
            .ok_or_else(|| anyhow!("Could not parse deadline '{}'. Try YYYY-MM-DD HH:MM.", input))?;
        patch = patch.deadline(Some(due));
    } else if args.clear_deadline {
        patch = patch.deadline(None);
    }
    Ok(patch)
}

/// Execute the done command: complete an active note, reopen a completed one
pub async fn run_done(notebook: &Notebook, args: &IdArgs) -> Result<()> {
    notebook.notes.load().await?;
    if notebook.notes.get(args.id).is_none() {
        println!("No note with ID {}.", args.id);
        return Ok(());
    }

    let note = notebook.notes.toggle_complete(args.id).await?;
    if note.completed {
        println!("Completed #{}.", note.id);
    } else {
        println!("Reopened #{} at the end of {}.", note.id, note.section.label());
    }
    Ok(())
}

/// Execute the move command. Positions are 1-based as printed by `list`.
pub async fn run_move(notebook: &Notebook, args: &MoveArgs) -> Result<()> {
    let (from, to) = match (args.from.checked_sub(1), args.to.checked_sub(1)) {
        (Some(from), Some(to)) => (from, to),
        _ => return Err(anyhow!("Positions start at 1.")),
    };

    notebook.notes.load().await?;
    if notebook.notes.reorder(args.section, from, to).await? {
        println!("Moved {} {} → {}.", args.section.label(), args.from, args.to);
    } else {
        let len = notebook.notes.section(args.section).len();
        println!("Nothing to move ({} has {} active notes).", args.section.label(), len);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Section;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn args() -> EditArgs {
        EditArgs {
            id: 1,
            title: None,
            section: None,
            deadline: None,
            clear_deadline: false,
        }
    }

    #[test]
    fn test_edit_patch_empty() {
        assert!(edit_patch(&args(), utc()).unwrap().is_empty());
    }

    #[test]
    fn test_edit_patch_fields() {
        let patch = edit_patch(
            &EditArgs {
                title: Some("New".to_string()),
                section: Some(Section::Later),
                deadline: Some("2025-01-02".to_string()),
                ..args()
            },
            utc(),
        )
        .unwrap();

        assert_eq!(patch.title.as_deref(), Some("New"));
        assert_eq!(patch.section, Some(Section::Later));
        assert!(matches!(patch.deadline, Some(Some(_))));
    }

    #[test]
    fn test_edit_patch_clear_deadline() {
        let patch = edit_patch(&EditArgs { clear_deadline: true, ..args() }, utc()).unwrap();
        assert_eq!(patch.deadline, Some(None));
    }

    #[test]
    fn test_edit_patch_bad_deadline() {
        let bad = EditArgs {
            deadline: Some("someday".to_string()),
            ..args()
        };
        assert!(edit_patch(&bad, utc()).is_err());
    }
}
