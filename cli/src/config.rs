//! Configuration file handling for the CLI.
//!
//! Stores the saved token, favourite property ids and an optional backend override in
//! `$XDG_CONFIG_HOME/estately/config.toml` (platform equivalent elsewhere).
//! Environment variables win over the file.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use estately_business::BusinessConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration stored on disk
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub favourites: FavouritesConfig,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Sent verbatim as the `Authorization` header
    pub token: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Used when `ESTATELY_API_URL` is not set
    pub url: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavouritesConfig {
    #[serde(default)]
    pub ids: BTreeSet<String>,
}

impl Config {
    /// Returns `$XDG_CONFIG_HOME/estately/config.toml` on Linux,
    /// appropriate paths on other platforms.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "estately", "estately")
            .context("Failed to determine config directory")?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Returns the default configuration if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn token(&self) -> Option<&str> {
        self.auth.token.as_deref()
    }

    pub fn set_token(&mut self, token: &str) {
        self.auth.token = Some(token.trim().to_owned());
    }

    pub fn clear_token(&mut self) {
        self.auth.token = None;
    }

    pub fn favourite_ids(&self) -> impl Iterator<Item = String> + '_ {
        self.favourites.ids.iter().cloned()
    }

    pub fn set_favourites(&mut self, ids: &BTreeSet<String>) {
        self.favourites.ids.clone_from(ids);
    }

    /// Merge the file with the process environment into a backend config.
    pub fn business_config(&self) -> Result<BusinessConfig> {
        self.business_config_from(std::env::vars())
    }

    pub fn business_config_from<I>(&self, vars: I) -> Result<BusinessConfig>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: Vec<(String, String)> = vars
            .into_iter()
            .filter(|(k, v)| !(k.starts_with("ESTATELY_") && v.trim().is_empty()))
            .collect();
        let has = |vars: &[(String, String)], key: &str| vars.iter().any(|(k, _)| k == key);

        if !has(&vars, "ESTATELY_API_URL")
            && let Some(url) = &self.api.url
        {
            vars.push(("ESTATELY_API_URL".to_owned(), url.clone()));
        }
        if !has(&vars, "ESTATELY_AUTH_TOKEN")
            && let Some(token) = self.token()
        {
            vars.push(("ESTATELY_AUTH_TOKEN".to_owned(), token.to_owned()));
        }

        BusinessConfig::from_vars(vars).context("Invalid backend configuration")
    }
}
