//! Configuration types and loading.
//!
//! Config is a small YAML file (default `~/.howld.yaml`): the JID to sign in
//! as, its password, and the webhook URLs to forward message bodies to. The
//! validated [`RelayConfig`] is built once at startup and handed to the relay
//! core by value; nothing reads configuration as global state.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Raw on-disk config, pre-validation. `jid` and `password` are optional
/// here only so a missing field can be reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    /// Account to authenticate as (e.g. "bot@example.org").
    pub jid: Option<String>,

    /// Authentication credential for the account.
    pub password: Option<String>,

    /// Webhook endpoints that receive forwarded message bodies. May be
    /// empty; messages are then dropped without error.
    #[serde(default)]
    pub webhooks: Vec<String>,
}

/// Validated startup configuration. Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub jid: String,
    pub password: String,
    pub webhooks: Vec<String>,
}

/// Missing required configuration. Fatal before any connection attempt.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("please provide a jid in {path}")]
    MissingJid { path: String },

    #[error("please provide a password in {path}")]
    MissingPassword { path: String },
}

impl RawConfig {
    /// Check the required fields, naming the first missing one. An empty or
    /// whitespace-only value counts as missing.
    pub fn validate(self, path: &Path) -> Result<RelayConfig, ConfigError> {
        let path_str = path.display().to_string();
        let jid = self
            .jid
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingJid { path: path_str.clone() })?
            .to_string();
        let password = self
            .password
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingPassword { path: path_str })?
            .to_string();
        Ok(RelayConfig {
            jid,
            password,
            webhooks: self.webhooks,
        })
    }
}

/// Resolve config path from env or default (`~/.howld.yaml`).
pub fn default_config_path() -> PathBuf {
    std::env::var("HOWLD_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".howld.yaml"))
                .unwrap_or_else(|| PathBuf::from(".howld.yaml"))
        })
}

/// Load the raw config from the given path (or HOWLD_CONFIG_PATH / the
/// default). Returns the config and the path that was used, so validation
/// errors can name the file.
pub fn load_config(path: Option<PathBuf>) -> Result<(RawConfig, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let config: RawConfig = serde_yaml::from_str(&s)
        .with_context(|| format!("parsing config from {}", path.display()))?;
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(jid: Option<&str>, password: Option<&str>) -> RawConfig {
        RawConfig {
            jid: jid.map(String::from),
            password: password.map(String::from),
            webhooks: vec![],
        }
    }

    #[test]
    fn valid_config_passes_through() {
        let cfg = raw(Some("bot@example.org"), Some("hunter2"))
            .validate(Path::new("/home/user/.howld.yaml"))
            .expect("valid");
        assert_eq!(cfg.jid, "bot@example.org");
        assert_eq!(cfg.password, "hunter2");
        assert!(cfg.webhooks.is_empty());
    }

    #[test]
    fn missing_jid_is_named_in_the_error() {
        let err = raw(None, Some("hunter2"))
            .validate(Path::new("/home/user/.howld.yaml"))
            .expect_err("missing jid");
        let msg = err.to_string();
        assert!(msg.contains("jid"), "got: {}", msg);
        assert!(msg.contains("/home/user/.howld.yaml"), "got: {}", msg);
    }

    #[test]
    fn missing_password_is_named_in_the_error() {
        let err = raw(Some("bot@example.org"), None)
            .validate(Path::new("/home/user/.howld.yaml"))
            .expect_err("missing password");
        assert!(err.to_string().contains("password"), "got: {}", err);
    }

    #[test]
    fn empty_password_counts_as_missing() {
        let err = raw(Some("bot@example.org"), Some("  "))
            .validate(Path::new("/home/user/.howld.yaml"))
            .expect_err("blank password");
        assert!(matches!(err, ConfigError::MissingPassword { .. }));
    }

    #[test]
    fn yaml_with_webhooks_parses() {
        let s = "jid: bot@example.org\npassword: hunter2\nwebhooks:\n  - https://hooks.example/a\n  - https://hooks.example/b\n";
        let cfg: RawConfig = serde_yaml::from_str(s).expect("parse");
        let cfg = cfg.validate(Path::new("test.yaml")).expect("valid");
        assert_eq!(
            cfg.webhooks,
            vec![
                "https://hooks.example/a".to_string(),
                "https://hooks.example/b".to_string()
            ]
        );
    }

    #[test]
    fn webhooks_default_to_empty() {
        let cfg: RawConfig =
            serde_yaml::from_str("jid: bot@example.org\npassword: hunter2\n").expect("parse");
        assert!(cfg.webhooks.is_empty());
    }
}
