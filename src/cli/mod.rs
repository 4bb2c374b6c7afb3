use clap::{Args, Parser, Subcommand};

use crate::models::{NoteId, QuoteId, Section};

pub mod add;
pub mod config;
pub mod delete;
pub mod display;
pub mod list;
pub mod quote;
pub mod update;

pub use add::run_add;
pub use config::run_config;
pub use delete::run_delete;
pub use list::run_list;
pub use quote::run_quote;
pub use update::{run_done, run_edit, run_move};

#[derive(Parser)]
#[command(name = "notely")]
#[command(about = "Sectioned notes and quotes, synced to your notes server")]
#[command(version)]
pub struct Cli {
    /// API root, overriding the config file and NOTELY_API_URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the board, or a single view of it
    List(ListArgs),
    /// Add a note to the end of a section
    Add(AddArgs),
    /// Change a note's title, section or deadline
    Edit(EditArgs),
    /// Mark a note done, or reopen it
    Done(IdArgs),
    /// Move a note within its section
    Move(MoveArgs),
    /// Delete a note
    Delete(IdArgs),
    /// List, add or delete quotes
    Quote(QuoteArgs),
    /// Show the effective configuration, or save new values
    Config(ConfigArgs),
}

impl Default for Commands {
    fn default() -> Self {
        Commands::List(ListArgs::default())
    }
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Only show one section: immediate (alias: now), todo (alias: to-do) or later
    #[arg(short, long)]
    pub section: Option<Section>,
    /// Only show completed notes
    #[arg(short, long)]
    pub completed: bool,
    /// Only show upcoming deadlines
    #[arg(short, long)]
    pub deadlines: bool,
}

#[derive(Args)]
pub struct AddArgs {
    pub title: String,
    /// immediate (alias: now), todo (alias: to-do) or later
    #[arg(short, long, default_value = "todo")]
    pub section: Section,
    /// YYYY-MM-DD, YYYY-MM-DD HH:MM, RFC 3339, "today" or "tomorrow"
    #[arg(short, long)]
    pub deadline: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: NoteId,
    #[arg(short, long)]
    pub title: Option<String>,
    /// Move to another section: immediate (alias: now), todo (alias: to-do) or later
    #[arg(short, long)]
    pub section: Option<Section>,
    #[arg(short, long, conflicts_with = "clear_deadline")]
    pub deadline: Option<String>,
    #[arg(long)]
    pub clear_deadline: bool,
}

#[derive(Args)]
pub struct IdArgs {
    pub id: NoteId,
}

#[derive(Args)]
pub struct MoveArgs {
    /// immediate (alias: now), todo (alias: to-do) or later
    pub section: Section,
    /// Current position, as numbered by `notely list`
    pub from: usize,
    /// New position
    pub to: usize,
}

#[derive(Args)]
pub struct QuoteArgs {
    #[command(subcommand)]
    pub command: Option<QuoteCommands>,
}

#[derive(Subcommand)]
pub enum QuoteCommands {
    /// List quotes
    List,
    /// Add a quote
    Add { text: String },
    /// Delete a quote
    Delete { id: QuoteId },
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Save the API root
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
    /// Save the request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Save the display offset, e.g. +06:00
    #[arg(long, value_name = "OFFSET", allow_hyphen_values = true)]
    pub utc_offset: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from(["notely", "add", "Buy milk", "-s", "immediate", "-d", "tomorrow"]).unwrap();
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.title, "Buy milk");
                assert_eq!(args.section, Section::Immediate);
                assert_eq!(args.deadline.as_deref(), Some("tomorrow"));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_add_defaults_to_todo() {
        let cli = Cli::try_parse_from(["notely", "add", "x"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Add(AddArgs { section: Section::Todo, .. }))));
    }

    #[test]
    fn test_parse_move_and_global_url() {
        let cli = Cli::try_parse_from(["notely", "move", "later", "3", "1", "--api-url", "http://x/api/"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://x/api/"));
        match cli.command {
            Some(Commands::Move(args)) => {
                assert_eq!(args.section, Section::Later);
                assert_eq!((args.from, args.to), (3, 1));
            }
            _ => panic!("expected move"),
        }
    }

    #[test]
    fn test_section_aliases() {
        let cli = Cli::try_parse_from(["notely", "move", "now", "2", "1"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Move(MoveArgs { section: Section::Immediate, .. }))));
        let cli = Cli::try_parse_from(["notely", "add", "x", "-s", "to-do"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Add(AddArgs { section: Section::Todo, .. }))));
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(Cli::try_parse_from(["notely", "add", "x", "-s", "finished"]).is_err());
    }

    #[test]
    fn test_deadline_conflicts_with_clear() {
        assert!(Cli::try_parse_from(["notely", "edit", "1", "-d", "today", "--clear-deadline"]).is_err());
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["notely"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_config_negative_offset() {
        let cli = Cli::try_parse_from(["notely", "config", "--utc-offset", "-05:00"]).unwrap();
        match cli.command {
            Some(Commands::Config(args)) => assert_eq!(args.utc_offset.as_deref(), Some("-05:00")),
            _ => panic!("expected config"),
        }
    }
}
