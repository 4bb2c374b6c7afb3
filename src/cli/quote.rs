use anyhow::Result;

use crate::cli::display::print_quotes;
use crate::cli::{QuoteArgs, QuoteCommands};
use crate::notebook::Notebook;

/// Execute the quote command. Lists quotes when no subcommand is given.
pub async fn run_quote(notebook: &Notebook, args: &QuoteArgs) -> Result<()> {
    notebook.quotes.load().await?;

    match args.command.as_ref().unwrap_or(&QuoteCommands::List) {
        QuoteCommands::List => {
            let quotes = notebook.quotes.quotes();
            if quotes.is_empty() {
                println!("No quotes yet.");
            } else {
                print_quotes(&quotes);
            }
        }
        QuoteCommands::Add { text } => match notebook.quotes.add(text).await? {
            Some(quote) => println!("Added quote #{}.", quote.id),
            None => println!("Quote text cannot be blank. Nothing added."),
        },
        QuoteCommands::Delete { id } => {
            if notebook.quotes.delete(*id).await? {
                println!("Deleted quote #{}.", id);
            } else {
                println!("No quote with ID {}.", id);
            }
        }
    }
    Ok(())
}
