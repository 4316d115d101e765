//! Command-line configuration for the binary.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::catalog::WritePolicy;
use crate::store::{default_library_path, default_log_dir};

/// Keep track of the books you own and read.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Library file. Defaults to `~/.personal-library/library.json`.
    #[arg(short, long)]
    pub library: Option<PathBuf>,
    /// Directory for log files. Defaults to `~/.personal-library/logs`.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
    /// Only save on Ctrl+S and on exit instead of after every change.
    #[arg(long)]
    pub manual_save: bool,
}

/// Fully resolved settings, with defaults filled in.
#[derive(Debug, Clone)]
pub struct Config {
    pub library_path: PathBuf,
    pub log_dir: PathBuf,
    pub write_policy: WritePolicy,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let library_path = match cli.library {
            Some(path) => path,
            None => default_library_path()?,
        };
        let log_dir = match cli.log_dir {
            Some(path) => path,
            None => default_log_dir()?,
        };
        let write_policy = if cli.manual_save {
            WritePolicy::Manual
        } else {
            WritePolicy::WriteThrough
        };

        Ok(Self {
            library_path,
            log_dir,
            write_policy,
        })
    }

    /// Parse `std::env::args` and resolve defaults.
    pub fn load() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_paths_win() {
        let cli = Cli::parse_from([
            "personal-library-manager",
            "--library",
            "/tmp/books.json",
            "--log-dir",
            "/tmp/logs",
            "--manual-save",
        ]);
        let config = Config::from_cli(cli).unwrap();

        assert_eq!(config.library_path, PathBuf::from("/tmp/books.json"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(config.write_policy, WritePolicy::Manual);
    }

    #[test]
    fn write_through_is_default() {
        let cli = Cli::parse_from(["personal-library-manager", "-l", "books.json", "--log-dir", "logs"]);
        let config = Config::from_cli(cli).unwrap();
        assert_eq!(config.write_policy, WritePolicy::WriteThrough);
    }
}
