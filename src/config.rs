//! Converter configuration.
//!
//! Loaded from a TOML file (`page-from-wiki.toml` in the working directory
//! unless `--config` points elsewhere). The file is optional: stock defaults
//! cover every key, and a user file only needs the values it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [wiki]
//! api_url = "http://192.168.1.14/wiki/api.php"     # MediaWiki api.php endpoint
//! index_url = "http://192.168.1.14/wiki/index.php" # Used for category pages
//! timeout_secs = 30                                # Per-request timeout
//!
//! [links]
//! pipeline = "cumulative"   # or "legacy"
//!
//! [site]
//! name = "Fractured Fairfax" # Shown in the page header
//! home = "/index.html"       # Header link target
//!
//! [publish]
//! bucket = "www.fracturedfairfax.com"
//! output_dir = "dist"        # Local destination when not uploading
//! # region = "us-east-1"     # Falls back to the AWS environment
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::rewrite::LinkPipeline;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "page-from-wiki.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where to fetch pages from.
    pub wiki: WikiConfig,
    /// Link rewriting behaviour.
    pub links: LinksConfig,
    /// Site-wide template values.
    pub site: SiteConfig,
    /// Publishing destination.
    pub publish: PublishConfig,
}

impl Config {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, url) in [
            ("wiki.api_url", &self.wiki.api_url),
            ("wiki.index_url", &self.wiki.index_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if self.wiki.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "wiki.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.publish.bucket.trim().is_empty() {
            return Err(ConfigError::Validation(
                "publish.bucket must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WikiConfig {
    /// MediaWiki `api.php` endpoint.
    pub api_url: String,
    /// MediaWiki `index.php` endpoint, used for `action=render`.
    pub index_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl WikiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            api_url: "http://192.168.1.14/wiki/api.php".to_string(),
            index_url: "http://192.168.1.14/wiki/index.php".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinksConfig {
    pub pipeline: LinkPipeline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site name shown in the header and appended to the `<title>`.
    pub name: String,
    /// Target of the header's home link.
    pub home: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Fractured Fairfax".to_string(),
            home: "/index.html".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Static-hosting bucket that receives the page.
    pub bucket: String,
    /// Directory used instead of the bucket when not uploading.
    pub output_dir: String,
    /// AWS region override. `None` defers to the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            bucket: "www.fracturedfairfax.com".to_string(),
            output_dir: "dist".to_string(),
            region: None,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Config::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key. Any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults if it is missing.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock config file.
///
/// Printed by `--print-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# page-from-wiki configuration
# ============================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Source wiki
# ---------------------------------------------------------------------------
[wiki]
# MediaWiki api.php endpoint (action=parse).
api_url = "http://192.168.1.14/wiki/api.php"

# MediaWiki index.php endpoint (action=render, category pages only).
index_url = "http://192.168.1.14/wiki/index.php"

# Per-request timeout in seconds.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Link rewriting
# ---------------------------------------------------------------------------
[links]
# "cumulative": strip redlinks, rewrite article links, then normalize the rest.
# "legacy":     only normalize, leaving redlinks as links to missing pages.
pipeline = "cumulative"

# ---------------------------------------------------------------------------
# Page template
# ---------------------------------------------------------------------------
[site]
name = "Fractured Fairfax"
home = "/index.html"

# ---------------------------------------------------------------------------
# Publishing
# ---------------------------------------------------------------------------
[publish]
# S3 bucket used with --s3.
bucket = "www.fracturedfairfax.com"

# Local directory used without --s3.
output_dir = "dist"

# AWS region. Omit to use AWS_REGION / the shared AWS config.
# region = "us-east-1"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.wiki.api_url, "http://192.168.1.14/wiki/api.php");
        assert_eq!(config.wiki.timeout(), Duration::from_secs(30));
        assert_eq!(config.links.pipeline, LinkPipeline::Cumulative);
        assert_eq!(config.publish.bucket, "www.fracturedfairfax.com");
        assert_eq!(config.publish.output_dir, "dist");
        assert!(config.publish.region.is_none());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[wiki]
api_url = "https://wiki.example.org/w/api.php"

[links]
pipeline = "legacy"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.wiki.api_url, "https://wiki.example.org/w/api.php");
        assert_eq!(config.links.pipeline, LinkPipeline::Legacy);
        // Defaults preserved
        assert_eq!(config.wiki.timeout_secs, 30);
        assert_eq!(config.site.name, "Fractured Fairfax");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config.publish.bucket, "www.fracturedfairfax.com");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(
            &path,
            r#"
[publish]
bucket = "pages.example.org"
region = "eu-west-1"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.publish.bucket, "pages.example.org");
        assert_eq!(config.publish.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.publish.output_dir, "dist");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.toml");
        fs::write(&path, "[wiki\napi_url = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let overlay: toml::Value = toml::from_str("[wiki]\napi_ulr = \"http://x\"").unwrap();
        assert!(resolve_config(Some(overlay)).is_err());
    }

    #[test]
    fn unknown_pipeline_rejected() {
        let overlay: toml::Value = toml::from_str("[links]\npipeline = \"fast\"").unwrap();
        assert!(resolve_config(Some(overlay)).is_err());
    }

    #[test]
    fn non_http_api_url_fails_validation() {
        let overlay: toml::Value = toml::from_str("[wiki]\napi_url = \"ftp://wiki\"").unwrap();
        let err = resolve_config(Some(overlay)).unwrap_err();
        assert!(err.to_string().contains("wiki.api_url"));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let overlay: toml::Value = toml::from_str("[wiki]\ntimeout_secs = 0").unwrap();
        assert!(matches!(
            resolve_config(Some(overlay)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn empty_bucket_fails_validation() {
        let overlay: toml::Value = toml::from_str("[publish]\nbucket = \"  \"").unwrap();
        assert!(resolve_config(Some(overlay)).is_err());
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\nz = 4").unwrap();
        let merged = merge_toml(base, overlay);
        let a = merged.get("a").unwrap();
        assert_eq!(a.get("x").unwrap().as_integer(), Some(1));
        assert_eq!(a.get("y").unwrap().as_integer(), Some(3));
        assert_eq!(a.get("z").unwrap().as_integer(), Some(4));
    }

    #[test]
    fn stock_config_toml_matches_defaults() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.wiki.api_url, defaults.wiki.api_url);
        assert_eq!(config.wiki.index_url, defaults.wiki.index_url);
        assert_eq!(config.links.pipeline, defaults.links.pipeline);
        assert_eq!(config.site.name, defaults.site.name);
        assert_eq!(config.publish.bucket, defaults.publish.bucket);
        assert_eq!(config.publish.output_dir, defaults.publish.output_dir);
    }
}
