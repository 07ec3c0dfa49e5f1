use crate::error::{GitError, Result};
use std::path::Path;

/// Opaque `[section]` / `key = value` persistence. Only one key is ever
/// interpreted by this crate (`core.repositoryformatversion`); everything
/// else round-trips as inert text.
///
/// Hand-rolled rather than pulled from a crate: `key = value` lines are
/// parsed the same way a `~/.gitconfig` reader would parse them by hand.
#[derive(Debug, Clone, Default)]
pub struct Config {
    entries: Vec<(String, String, String)>, // (section, key, value)
}

impl Config {
    pub fn default_repo_config() -> Config {
        let mut config = Config::default();
        config.set("core", "repositoryformatversion", "0");
        config.set("core", "filemode", "false");
        config.set("core", "bare", "false");
        config
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(s, k, _)| s == section && k == key)
            .map(|(_, _, v)| v.as_str())
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(s, k, _)| s == section && k == key)
        {
            entry.2 = value;
        } else {
            self.entries
                .push((section.to_string(), key.to_string(), value));
        }
    }

    pub fn parse(text: &str) -> Config {
        let mut config = Config::default();
        let mut section = String::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                section = name.trim().to_string();
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config.set(section.as_str(), key.trim(), value.trim());
            }
        }
        config
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let mut current_section: Option<&str> = None;
        for (section, key, value) in &self.entries {
            if current_section != Some(section.as_str()) {
                if current_section.is_some() {
                    out.push('\n');
                }
                out.push('[');
                out.push_str(section);
                out.push_str("]\n");
                current_section = Some(section.as_str());
            }
            out.push('\t');
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    pub fn read_file(path: &Path) -> Result<Config> {
        let text =
            std::fs::read_to_string(path).map_err(|e| GitError::io(path.display().to_string(), e))?;
        Ok(Config::parse(&text))
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_text())
            .map_err(|e| GitError::io(path.display().to_string(), e))
    }

    /// Validates `core.repositoryformatversion == 0`, per spec.
    pub fn check_format_version(&self) -> Result<()> {
        let version = self
            .get("core", "repositoryformatversion")
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        if version != 0 {
            return Err(GitError::UnsupportedFormat { version });
        }
        Ok(())
    }
}
