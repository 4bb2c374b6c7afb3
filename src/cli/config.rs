use std::path::Path;

use anyhow::{anyhow, Result};

use crate::cli::ConfigArgs;
use crate::config::{parse_utc_offset, Config};

/// Execute the config command.
///
/// With no flags, prints the effective settings (file, environment and
/// `--api-url` combined). With flags, validates them and saves them to the
/// config file.
pub fn run_config(effective: &Config, args: &ConfigArgs) -> Result<()> {
    let path = Config::default_path()?;
    let changes = changes_from(args)?;

    if changes == Config::default() {
        println!("Config file: {}", path.display());
        println!("API URL:     {}", effective.effective_api_url());
        println!("Timeout:     {}s", effective.effective_timeout().as_secs());
        println!("UTC offset:  {}", effective.display_offset()?);
        return Ok(());
    }

    save_changes(&path, changes)?;
    println!("Saved {}", path.display());
    Ok(())
}

fn changes_from(args: &ConfigArgs) -> Result<Config> {
    if let Some(url) = &args.url {
        url::Url::parse(url.trim()).map_err(|e| anyhow!("Invalid API URL '{}': {}", url, e))?;
    }
    if let Some(offset) = &args.utc_offset {
        parse_utc_offset(offset).ok_or_else(|| anyhow!("Invalid UTC offset '{}'. Use +HH:MM.", offset))?;
    }
    if args.timeout == Some(0) {
        return Err(anyhow!("Timeout must be at least one second."));
    }

    Ok(Config {
        api_url: args.url.as_ref().map(|u| u.trim().to_string()),
        timeout_secs: args.timeout,
        utc_offset: args.utc_offset.as_ref().map(|o| o.trim().to_string()),
    })
}

/// Merge into the file's own values, leaving environment overrides out.
fn save_changes(path: &Path, changes: Config) -> Result<()> {
    let mut file_config = if path.exists() {
        Config::load_from(path)?
    } else {
        Config::default()
    };
    file_config.merge(changes);
    file_config.save(path)?;
    Ok(())
}
