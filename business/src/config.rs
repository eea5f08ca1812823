//! Backend endpoint configuration.
//!
//! The base URL comes from `ESTATELY_API_URL` (a `.env` file is honoured). There is
//! no fallback host: a missing or malformed URL is a startup error.

use estately_states::State;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ESTATELY_API_URL is not set; point it at the property backend (e.g. http://localhost:8000)")]
    MissingApiUrl,
    #[error("{var} must be an absolute http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },
    #[error("failed to read configuration from environment: {0}")]
    Env(String),
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    estately_api_url: Option<String>,
    estately_upload_url: Option<String>,
    estately_auth_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessConfig {
    api_base_url: String,
    upload_url: Option<String>,
    /// Sent verbatim in the `Authorization` header.
    auth_token: Option<String>,
}

impl State for BusinessConfig {}

impl BusinessConfig {
    pub fn new(api_base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
        let raw = api_base_url.as_ref().trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }
        Ok(Self {
            api_base_url: normalize_url("ESTATELY_API_URL", raw)?,
            upload_url: None,
            auth_token: None,
        })
    }

    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("loaded environment overrides from {}", path.display());
        }
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, S>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let raw: RawConfig =
            serde_env::from_iter(vars).map_err(|e| ConfigError::Env(e.to_string()))?;

        let api_url = raw.estately_api_url.ok_or(ConfigError::MissingApiUrl)?;
        let mut config = Self::new(api_url)?;

        if let Some(upload) = raw.estately_upload_url.filter(|u| !u.trim().is_empty()) {
            config = config.with_upload_url(upload)?;
        }
        config.auth_token = raw.estately_auth_token.filter(|t| !t.trim().is_empty());

        log::info!("using property backend at {}", config.api_base_url);
        Ok(config)
    }

    pub fn with_upload_url(mut self, url: impl AsRef<str>) -> Result<Self, ConfigError> {
        self.upload_url = Some(normalize_url("ESTATELY_UPLOAD_URL", url.as_ref().trim())?);
        Ok(self)
    }

    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn properties_url(&self) -> String {
        format!("{}/property", self.api_base_url)
    }

    pub fn property_url(&self, id: &str) -> String {
        format!("{}/property/{id}", self.api_base_url)
    }

    pub fn feedback_url(&self) -> String {
        format!("{}/feedback", self.api_base_url)
    }

    pub fn upload_url(&self) -> String {
        match &self.upload_url {
            Some(url) => url.clone(),
            None => format!("{}/upload-photos", self.api_base_url),
        }
    }
}

fn normalize_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        var,
        value: raw.to_owned(),
    };
    let parsed = Url::parse(raw).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(invalid());
    }
    Ok(raw.trim_end_matches('/').to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_url_fails_fast() {
        let vars: Vec<(&str, &str)> = vec![("HOME", "/root")];
        assert_eq!(
            BusinessConfig::from_vars(vars),
            Err(ConfigError::MissingApiUrl)
        );
        assert_eq!(BusinessConfig::new("   "), Err(ConfigError::MissingApiUrl));
    }

    #[test]
    fn malformed_api_url_is_rejected() {
        for bad in ["localhost:8000", "ftp://files.example.com", "not a url"] {
            let err = BusinessConfig::new(bad).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidUrl { var: "ESTATELY_API_URL", .. }),
                "{bad} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn endpoint_urls_are_built_from_trimmed_base() {
        let config = BusinessConfig::new("http://localhost:8000/").unwrap();
        assert_eq!(config.api_base_url(), "http://localhost:8000");
        assert_eq!(config.properties_url(), "http://localhost:8000/property");
        assert_eq!(config.property_url("42"), "http://localhost:8000/property/42");
        assert_eq!(config.feedback_url(), "http://localhost:8000/feedback");
        assert_eq!(config.upload_url(), "http://localhost:8000/upload-photos");
    }

    #[test]
    fn optional_variables_are_read() {
        let config = BusinessConfig::from_vars(vec![
            ("ESTATELY_API_URL", "https://api.example.com"),
            ("ESTATELY_UPLOAD_URL", "https://media.example.com/upload-photos"),
            ("ESTATELY_AUTH_TOKEN", "secret-token"),
        ])
        .unwrap();

        assert_eq!(config.upload_url(), "https://media.example.com/upload-photos");
        assert_eq!(config.auth_token(), Some("secret-token"));
    }

    #[test]
    fn blank_token_is_treated_as_absent() {
        let config = BusinessConfig::from_vars(vec![
            ("ESTATELY_API_URL", "https://api.example.com"),
            ("ESTATELY_AUTH_TOKEN", "  "),
        ])
        .unwrap();
        assert_eq!(config.auth_token(), None);
    }
}
