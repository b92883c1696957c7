//! Init and Config commands.

use anyhow::{Context, anyhow};

use crate::config::Settings;
use crate::session::Session;

/// Run init command - create the settings file, watchlist and manifest.
pub fn run_init(settings: Settings, force: bool) -> anyhow::Result<()> {
    let root = settings.project_root();

    let config_path = Settings::init_config_file(&root, force).map_err(|e| anyhow!("{e}"))?;
    println!("Created configuration file at: {}", config_path.display());

    let session = Session::new(settings)?;
    let prep = session
        .prepare()
        .context("failed to set up the project root")?;

    if prep.watchlist_created {
        println!(
            "Created {}. Add relative file paths to track, one per line.",
            session.engine().watchlist_name()
        );
    }
    if prep.manifest_created {
        println!("Created {}.", session.engine().manifest_name());
    }
    println!("Edit {} to customize your settings.", config_path.display());
    Ok(())
}

/// Run config command - display current configuration.
pub fn run_config(settings: &Settings) -> anyhow::Result<()> {
    let toml_str = toml::to_string_pretty(settings).context("failed to render settings")?;
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    println!("{toml_str}");
    Ok(())
}
