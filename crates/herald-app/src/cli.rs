//! CLI argument definitions for the Herald dispatcher.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::{Path, PathBuf};

/// Herald: confirmation-gated action dispatch over a JSON-lines stdin protocol.
#[derive(Parser, Debug)]
#[command(name = "herald", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > HERALD_CONFIG env var > ~/.herald/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("HERALD_CONFIG") {
            return PathBuf::from(p);
        }
        home_dir()
            .map(|home| home.join(".herald").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let home = std::env::var("USERPROFILE");
    #[cfg(not(target_os = "windows"))]
    let home = std::env::var("HOME");
    home.ok().map(PathBuf::from)
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None => Path::new(path).to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_flag_wins() {
        let args = CliArgs::parse_from(["herald", "--config", "/etc/herald.toml"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/etc/herald.toml"));
    }

    #[test]
    fn test_log_level_flag() {
        let args = CliArgs::parse_from(["herald", "-l", "debug"]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/srv/docs"), PathBuf::from("/srv/docs"));
        assert_eq!(expand_home("docs"), PathBuf::from("docs"));
    }

    #[test]
    fn test_expand_home_strips_tilde() {
        let expanded = expand_home("~/.herald/projects");
        assert!(expanded.ends_with(".herald/projects"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }
}
