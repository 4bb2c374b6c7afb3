use anyhow::Result;
use chrono::FixedOffset;

use crate::cli::display::{print_card, print_heading, print_quotes, CardLayout};
use crate::cli::ListArgs;
use crate::models::Section;
use crate::notebook::Notebook;
use crate::store::{Board, NoteCard};

/// Execute the list command (also the default with no subcommand)
pub async fn run_list(notebook: &Notebook, args: &ListArgs, offset: FixedOffset) -> Result<()> {
    notebook.notes.load().await?;
    let board = notebook.notes.board();
    let layout = CardLayout::default();

    if args.completed {
        print_completed(&board.completed, offset, &layout);
        return Ok(());
    }
    if args.deadlines {
        print_deadlines(&board.deadlines, offset, &layout);
        return Ok(());
    }
    if let Some(section) = args.section {
        print_section(&board, section, offset, &layout);
        return Ok(());
    }

    // Quotes are decoration; the board still renders without them.
    if let Err(e) = notebook.quotes.load().await {
        tracing::warn!(error = %e, "could not load quotes");
        eprintln!("Warning: could not load quotes: {}", e);
    }
    print_board(&board, notebook, offset, &layout);
    Ok(())
}

fn print_board(board: &Board, notebook: &Notebook, offset: FixedOffset, layout: &CardLayout) {
    if board.is_empty() {
        println!("No notes yet. Add one with `notely add \"...\"`.");
        return;
    }

    if !board.deadlines.is_empty() {
        print_deadlines(&board.deadlines, offset, layout);
        println!();
    }

    let quotes = notebook.quotes.quotes();
    if !quotes.is_empty() {
        print_heading("Quotes");
        print_quotes(&quotes);
        println!();
    }

    for (section, cards) in &board.sections {
        if cards.is_empty() {
            continue;
        }
        print_cards(section.label(), cards, offset, layout);
        println!();
    }

    if !board.completed.is_empty() {
        print_completed(&board.completed, offset, layout);
    }
}

fn print_section(board: &Board, section: Section, offset: FixedOffset, layout: &CardLayout) {
    let cards = board
        .sections
        .iter()
        .find(|(s, _)| *s == section)
        .map(|(_, cards)| cards.as_slice())
        .unwrap_or_default();

    if cards.is_empty() {
        println!("{} is empty.", section.label());
        return;
    }
    print_cards(section.label(), cards, offset, layout);
}

fn print_cards(heading: &str, cards: &[NoteCard], offset: FixedOffset, layout: &CardLayout) {
    print_heading(heading);
    for (i, card) in cards.iter().enumerate() {
        print_card(card, Some(i + 1), offset, layout);
    }
}

fn print_completed(cards: &[NoteCard], offset: FixedOffset, layout: &CardLayout) {
    if cards.is_empty() {
        println!("Nothing completed yet.");
        return;
    }
    print_heading("Completed");
    for card in cards {
        print_card(card, None, offset, layout);
    }
}

fn print_deadlines(cards: &[NoteCard], offset: FixedOffset, layout: &CardLayout) {
    if cards.is_empty() {
        println!("No upcoming deadlines.");
        return;
    }
    print_heading("Upcoming Deadlines");
    for card in cards {
        print_card(card, None, offset, layout);
    }
}
