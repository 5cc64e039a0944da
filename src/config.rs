//! # Configuration
//!
//! Service configuration: the public base address used to derive the
//! service's `did:web` identifier and the directory holding its key pair.

use std::env;
use std::path::{Path, PathBuf};

/// Base address used when `BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Key directory used when `KEY_DIR` is not set.
pub const DEFAULT_KEY_DIR: &str = "./keys";

/// Service configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Scheme, host, optional port and optional path the service is
    /// published at. For example, `https://example.com/issuers/acme`.
    pub base_url: String,

    /// Directory holding `private.pem` and `public.pem`.
    pub key_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            key_dir: absolute(Path::new(DEFAULT_KEY_DIR)),
        }
    }
}

impl Config {
    /// Read configuration from the `BASE_URL` and `KEY_DIR` environment
    /// variables, falling back to defaults for either when unset or empty.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let key_dir = env::var("KEY_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_KEY_DIR.to_string());

        Self {
            base_url,
            key_dir: absolute(Path::new(&key_dir)),
        }
    }

    /// Set the base address.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the key directory. Relative paths are resolved against the
    /// current working directory.
    #[must_use]
    pub fn key_dir(mut self, key_dir: impl AsRef<Path>) -> Self {
        self.key_dir = absolute(key_dir.as_ref());
        self
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(config.key_dir.is_absolute());
        assert!(config.key_dir.ends_with("keys"));
    }

    #[test]
    fn builder_overrides() {
        let config = Config::default().base_url("https://example.com/issuers").key_dir("/tmp/vc");
        assert_eq!(config.base_url, "https://example.com/issuers");
        assert_eq!(config.key_dir, PathBuf::from("/tmp/vc"));
    }

    #[test]
    fn relative_key_dir_is_resolved() {
        let config = Config::default().key_dir("var/keys");
        assert!(config.key_dir.is_absolute());
        assert!(config.key_dir.ends_with("var/keys"));
    }
}
