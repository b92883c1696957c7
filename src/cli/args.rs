//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::config::Settings;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Keeps managed header blocks on watched files
#[derive(Parser)]
#[command(
    name = "headwatch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Keep managed header blocks at the top of watched files",
    long_about = "Watches the files listed in a watchlist and keeps a managed header block \
                  at the top of each one. The manifest file carries a live project tree.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, env = "HEADWATCH_ROOT")]
    pub root: Option<PathBuf>,

    /// Watchlist file name at the project root
    #[arg(long, global = true)]
    pub watchlist: Option<String>,

    /// Manifest file name at the project root
    #[arg(long, global = true)]
    pub manifest: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Default, PartialEq, Eq)]
pub enum Commands {
    /// Watch the watchlist and keep headers current (default)
    #[default]
    Watch,

    /// Update every header once and exit
    Sync,

    /// Print the project tree used in the manifest
    Tree,

    /// Create .headwatch/settings.toml, the watchlist and the manifest
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Display active settings
    Config,
}

impl Cli {
    /// Load settings from file and environment, then apply CLI overrides.
    ///
    /// Without `--config`, a settings file under `--root` is preferred over
    /// one found from the current directory.
    pub fn load_settings(&self) -> Result<Settings, Box<figment::Error>> {
        let mut settings = match (&self.config, &self.root) {
            (Some(path), _) => Settings::load_from(path)?,
            (None, Some(root)) if Settings::config_path(root).exists() => {
                Settings::load_from(Settings::config_path(root))?
            }
            _ => Settings::load()?,
        };
        self.apply_overrides(&mut settings);
        Ok(settings)
    }

    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(root) = &self.root {
            settings.root = Some(root.clone());
        }
        if let Some(watchlist) = &self.watchlist {
            settings.watchlist = watchlist.clone();
        }
        if let Some(manifest) = &self.manifest {
            settings.manifest = manifest.clone();
        }
    }
}
