use std::env;

use url::Url;

use crate::error::ApiError;

/// Where the lesson backend lives and how to authenticate against it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    token: Option<String>,
}

impl ApiConfig {
    /// Build a config. The base path always ends with `/` so endpoints join beneath it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidBaseUrl` if `base_url` does not parse.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let token = token.filter(|t| !t.trim().is_empty());
        Ok(Self { base_url, token })
    }

    /// Read `LESSON_API_BASE_URL` and the optional `LESSON_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotConfigured` when the base url is unset or blank, and
    /// `ApiError::InvalidBaseUrl` when it does not parse.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup("LESSON_API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ApiError::NotConfigured)?;
        Self::new(&base_url, lookup("LESSON_API_TOKEN"))
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Resolve an endpoint path relative to the base url.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidBaseUrl` if the joined url is invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}
