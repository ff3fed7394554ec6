//! Configuration file parsing.
//!
//! The configuration is read once at startup and handed by value to the
//! [`ArticleMaker`](crate::maker::ArticleMaker); nothing reads it afterwards.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Lookup settings plus the dictionaries and groups to serve.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Start big articles collapsed when several dictionaries answer.
    pub collapse_big_articles: bool,
    /// Visible characters above which an article counts as big.
    pub article_size_limit: usize,
    pub expand_optional_parts: bool,
    pub ignore_diacritics: bool,
    /// Dictionary files, relative to the configuration file's directory.
    pub dictionaries: Vec<PathBuf>,
    pub groups: Vec<GroupConfig>,
    /// Dictionary ids left out of every lookup.
    pub muted: Vec<String>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            collapse_big_articles: false,
            article_size_limit: 2000,
            expand_optional_parts: false,
            ignore_diacritics: false,
            dictionaries: Vec::new(),
            groups: Vec::new(),
            muted: Vec::new(),
        }
    }
}

/// A named set of dictionaries, looked up together.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupConfig {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    /// Dictionary ids in display order.
    #[serde(default)]
    pub dictionaries: Vec<String>,
}

impl LookupConfig {
    /// Reads a configuration file, resolving relative dictionary paths
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;

        if let Some(base) = path.parent() {
            for dictionary in &mut config.dictionaries {
                if dictionary.is_relative() {
                    *dictionary = base.join(&*dictionary);
                }
            }
        }

        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// `<config dir>/dict-aggregator/config.toml`, if the platform has a
    /// configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dict-aggregator").join("config.toml"))
    }

    /// Loads the file at [`default_path`](Self::default_path), falling back to
    /// defaults when it does not exist.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Size limit to pass to lookups, `None` when collapsing is off.
    pub fn collapse_threshold(&self) -> Option<usize> {
        self.collapse_big_articles.then_some(self.article_size_limit)
    }
}
