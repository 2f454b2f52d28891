//! User configuration (`config.toml`).
//!
//! Looked up in the platform config directory (e.g. `~/.config/tally/` on
//! Linux) unless a path is given with `--config`. A missing default file is
//! not an error; a broken one is reported as a warning and defaults are used.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, TallyError};
use tally_engine::engine::{DEFAULT_COLS, DEFAULT_ROWS, MAX_CELLS};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of rows in the sheet.
    pub rows: usize,
    /// Number of columns in the sheet.
    pub cols: usize,
    /// Display width of every column, in characters.
    pub column_width: usize,
    /// Height of every grid row, in terminal lines.
    pub row_height: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            column_width: 10,
            row_height: 1,
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "tally", "tally")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

impl Config {
    pub fn from_toml(path: &Path, content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content).map_err(|e| TallyError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.check(path)?;
        Ok(config)
    }

    fn check(&self, path: &Path) -> Result<()> {
        let cells = self.rows.checked_mul(self.cols);
        let problem = if self.rows == 0 || self.cols == 0 {
            Some("rows and cols must be at least 1")
        } else if cells.is_none_or(|n| n > MAX_CELLS) {
            Some("rows * cols is too large")
        } else if self.column_width == 0 {
            Some("column_width must be at least 1")
        } else if self.row_height == 0 {
            Some("row_height must be at least 1")
        } else {
            None
        };
        match problem {
            Some(message) => Err(TallyError::Config {
                path: path.to_path_buf(),
                message: message.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn read(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;
        Config::from_toml(path, &content)
    }

    /// Load the explicit file, or the user's default file if it exists.
    /// Returns the config plus any warnings to show the user.
    pub fn load(explicit: Option<&Path>) -> (Config, Vec<String>) {
        let mut warnings = Vec::new();
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => user_config_path().filter(|p| p.exists()),
        };

        let config = match path {
            Some(path) => match Config::read(&path) {
                Ok(config) => config,
                Err(err) => {
                    warnings.push(format!("{err}; using defaults"));
                    Config::default()
                }
            },
            None => Config::default(),
        };
        (config, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml(Path::new("t.toml"), "column_width = 14\n").unwrap();
        assert_eq!(config.column_width, 14);
        assert_eq!(config.rows, DEFAULT_ROWS);
        assert_eq!(config.row_height, 1);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_toml(Path::new("t.toml"), "colour = 3\n").unwrap_err();
        assert!(matches!(err, TallyError::Config { .. }));
    }

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(Config::from_toml(Path::new("t.toml"), "rows = 0\n").is_err());
        assert!(Config::from_toml(Path::new("t.toml"), "column_width = 0\n").is_err());
    }

    #[test]
    fn test_huge_sizes_rejected() {
        let huge = "rows = 100000000000\ncols = 100000000000\n";
        let err = Config::from_toml(Path::new("big.toml"), huge).unwrap_err();
        assert!(err.to_string().contains("too large"));
        assert!(Config::from_toml(Path::new("t.toml"), "rows = 2000\ncols = 2000\n").is_err());
        assert!(Config::from_toml(Path::new("t.toml"), "rows = 1024\ncols = 1024\n").is_ok());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("tally-big-{}.toml", std::process::id()));
        std::fs::write(&path, "rows = 100000000000\ncols = 100000000000\n").unwrap();
        let (config, warnings) = Config::load(Some(&path));
        let _ = std::fs::remove_file(&path);
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_missing_explicit_file_warns() {
        let (config, warnings) = Config::load(Some(Path::new("/nonexistent/tally.toml")));
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
    }
}
