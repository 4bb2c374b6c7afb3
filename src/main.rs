use clap::Parser;
use notely::cli::{run_add, run_config, run_delete, run_done, run_edit, run_list, run_move, run_quote, Cli, Commands};
use notely::{Config, Notebook, NotelyError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("NOTELY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = Some(url);
    }

    let command = cli.command.unwrap_or_default();
    if let Commands::Config(args) = &command {
        return run_config(&config, args);
    }

    let notebook = Notebook::connect(&config)?;
    let offset = config.display_offset()?;

    let result = match &command {
        Commands::List(args) => run_list(&notebook, args, offset).await,
        Commands::Add(args) => run_add(&notebook, args, offset).await,
        Commands::Edit(args) => run_edit(&notebook, args, offset).await,
        Commands::Done(args) => run_done(&notebook, args).await,
        Commands::Move(args) => run_move(&notebook, args).await,
        Commands::Delete(args) => run_delete(&notebook, args).await,
        Commands::Quote(args) => run_quote(&notebook, args).await,
        // Handled before connecting
        Commands::Config(_) => Ok(()),
    };

    if let Err(e) = &result {
        if e.downcast_ref::<NotelyError>().is_some_and(NotelyError::is_retryable) {
            eprintln!("Is the notes server running at {}?", config.effective_api_url());
        }
    }
    result
}
