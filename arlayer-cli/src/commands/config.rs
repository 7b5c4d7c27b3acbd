//! `config get|set|list|path` - inspect and edit the INI configuration.

use std::path::Path;

use arlayer::config::{ConfigFile, ConfigKey};
use clap::Subcommand;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting name as section.key (e.g. assets.verify_files)
        key: String,
    },

    /// Change one setting and save the file
    Set {
        /// Setting name as section.key (e.g. assets.verify_files)
        key: String,

        /// New value
        value: String,
    },

    /// Print every setting grouped by section
    List,

    /// Print the configuration file location
    Path,
}

/// Run a config subcommand against the file at `path`.
pub fn run(command: ConfigCommands, path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            let config = ConfigFile::load_from(path)?;
            println!("{}", display_value(&key.get(&config)));
        }
        ConfigCommands::Set { key, value } => {
            let key = set_value(path, &key, &value)?;
            println!("{} = {}", key.name(), value.trim());
        }
        ConfigCommands::List => {
            let config = ConfigFile::load_from(path)?;
            print!("{}", render_listing(&config));
        }
        ConfigCommands::Path => println!("{}", path.display()),
    }
    Ok(())
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown setting '{}'. Run 'arlayer config list' for the full list.",
            key
        ))
    })
}

/// Validate and persist one setting. The file is only written when the
/// value parses.
fn set_value(path: &Path, key: &str, value: &str) -> Result<ConfigKey, CliError> {
    let key = parse_key(key)?;
    let mut config = ConfigFile::load_from(path)?;
    key.set(&mut config, value)?;
    config.save_to(path)?;
    Ok(key)
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

fn render_listing(config: &ConfigFile) -> String {
    let mut out = String::new();
    let mut section = "";

    for key in ConfigKey::all() {
        if key.section() != section {
            if !section.is_empty() {
                out.push('\n');
            }
            section = key.section();
            out.push_str(&format!("[{}]\n", section));
        }
        out.push_str(&format!(
            "  {} = {}\n",
            key.key_name(),
            display_value(&key.get(config))
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_persists_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        set_value(&path, "assets.verify_files", "false").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert!(!config.assets.verify_files);
    }

    #[test]
    fn test_invalid_value_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let err = set_value(&path, "tracking.default_confidence", "4.0").unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_unknown_key() {
        let dir = TempDir::new().unwrap();
        let err = set_value(&dir.path().join("config.ini"), "session.colour", "x").unwrap_err();
        assert!(err.to_string().contains("arlayer config list"));
    }

    #[test]
    fn test_listing_groups_sections() {
        let listing = render_listing(&ConfigFile::default());
        assert!(listing.starts_with("[session]\n"));
        assert!(listing.contains("\n[logging]\n"));
        assert!(listing.contains("  directory = (not set)"));
        assert_eq!(listing.matches("[assets]").count(), 1);
    }
}
