//! Text rendering and input parsing shared by the subcommands.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use crossterm::style::{Color, Stylize};

use crate::models::Quote;
use crate::store::{NoteCard, Tint};

/// Format a timestamp in the display offset, e.g. `15/03/25, 9:30 AM`
pub fn format_timestamp(dt: DateTime<Utc>, offset: FixedOffset) -> String {
    dt.with_timezone(&offset).format("%d/%m/%y, %-I:%M %p").to_string()
}

/// Parse deadline input, interpreting wall-clock times in `offset`.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD HH:MM`, `YYYY-MM-DD`
/// (midnight), and `today` / `tomorrow` (end of day).
pub fn parse_deadline(input: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    let today = Utc::now().with_timezone(&offset).date_naive();
    let naive = match input.to_lowercase().as_str() {
        "today" => today.and_hms_opt(23, 59, 0)?,
        "tomorrow" => today.succ_opt()?.and_hms_opt(23, 59, 0)?,
        _ => ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(input, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })?,
    };

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Collapse to one line and cut at `max_chars`, ending in an ellipsis.
pub fn truncate(s: &str, max_chars: usize) -> String {
    let line: String = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() <= max_chars {
        return line;
    }
    if max_chars == 0 {
        return String::new();
    }
    let cut: String = line.chars().take(max_chars - 1).collect();
    format!("{}…", cut)
}

pub fn tint_color(tint: Tint) -> Color {
    match tint {
        Tint::Lime => Color::Green,
        Tint::Sky => Color::Cyan,
        Tint::Yellow => Color::Yellow,
        Tint::Red => Color::Red,
    }
}

/// Column layout for card rows
pub struct CardLayout {
    pub title_width: usize,
}

impl Default for CardLayout {
    fn default() -> Self {
        let term_width = crossterm::terminal::size()
            .map(|(w, _)| w as usize)
            .unwrap_or(80);

        if term_width >= 100 {
            CardLayout { title_width: 56 }
        } else {
            CardLayout { title_width: 36 }
        }
    }
}

/// Plain text of one card row. `index` is the 1-based position shown for
/// active notes.
pub fn card_line(card: &NoteCard, index: Option<usize>, offset: FixedOffset, layout: &CardLayout) -> String {
    let note = &card.note;
    let marker = match index {
        Some(i) => format!("{:>3}.", i),
        None if note.completed => "  ✓ ".to_string(),
        None => "  - ".to_string(),
    };
    let id = format!("#{}", note.id);

    let when = if let (true, Some(at)) = (note.completed, note.completed_at) {
        format!("done {}", format_timestamp(at, offset))
    } else if let (false, Some(due)) = (note.completed, note.deadline) {
        let overdue = if due < Utc::now() { " (overdue)" } else { "" };
        format!("due {}{}", format_timestamp(due, offset), overdue)
    } else {
        String::new()
    };

    format!(
        "{} {:<6} {:<width$}  {}",
        marker,
        id,
        truncate(&note.title, layout.title_width),
        when,
        width = layout.title_width
    )
    .trim_end()
    .to_string()
}

pub fn print_card(card: &NoteCard, index: Option<usize>, offset: FixedOffset, layout: &CardLayout) {
    let swatch = "█".with(tint_color(card.tint));
    let line = card_line(card, index, offset, layout);
    if card.note.completed {
        println!("{} {}", swatch, line.dark_grey());
    } else {
        println!("{} {}", swatch, line);
    }
}

pub fn print_heading(text: &str) {
    println!("{}", text.bold());
}

pub fn print_quotes(quotes: &[Quote]) {
    for quote in quotes {
        println!("  [{}] “{}”", quote.id, truncate(&quote.text, 70).italic());
    }
}
