//! Config file loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use catalog_scraper_core::ScraperConfig;
use catalog_scraper_core::config::{MAX_CONCURRENCY, MIN_CONCURRENCY};

use crate::cli::Args;

const APP_DIR: &str = "catalog-scraper";

/// File-backed defaults, each overridable by a CLI flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Site root to crawl.
    pub base_url: Option<String>,
    /// Product-path marker matched against sitemap entries.
    pub product_marker: Option<String>,
    /// Directory images are written to.
    pub output_dir: Option<PathBuf>,
    /// Worker count.
    pub processes: Option<usize>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: Option<u64>,
    /// User-Agent override.
    pub user_agent: Option<String>,
}

impl FileConfig {
    /// Validates values that can be checked without the rest of the config.
    pub fn validate(&self) -> Result<()> {
        if let Some(processes) = self.processes
            && !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&processes)
        {
            bail!(
                "Invalid config value for `processes`: {processes}. Expected range: {MIN_CONCURRENCY}..={MAX_CONCURRENCY}"
            );
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        if self.product_marker.as_deref() == Some("") {
            bail!("Invalid config value for `product_marker`: must not be empty");
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/catalog-scraper/config.toml`
/// 2. `$HOME/.config/catalog-scraper/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join(APP_DIR).join("config.toml"));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path; a missing file yields `None`.
pub fn load_default_file_config() -> Result<Option<FileConfig>> {
    let Some(path) = resolve_default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    load_file_config(&path).map(Some)
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_index + 1;

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "base_url" => cfg.base_url = Some(parse_string_literal(value).with_context(invalid)?),
            "product_marker" => {
                cfg.product_marker = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "processes" => {
                let parsed = parse_integer_u64(value).with_context(invalid)?;
                let n = usize::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("processes out of range for usize"))?;
                cfg.processes = Some(n);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "user_agent" => {
                cfg.user_agent = Some(parse_string_literal(value).with_context(invalid)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

/// Layers CLI flags over file values over library defaults.
pub fn resolve_scraper_config(args: &Args, file: Option<&FileConfig>) -> ScraperConfig {
    let file = file.cloned().unwrap_or_default();
    let mut config = ScraperConfig::default();

    if let Some(base_url) = args.base_url.clone().or(file.base_url) {
        config = config.with_base_url(base_url);
    }
    if let Some(marker) = args.marker.clone().or(file.product_marker) {
        config = config.with_product_marker(marker);
    }
    if let Some(dir) = args.output_dir.clone().or(file.output_dir) {
        config = config.with_image_dir(dir);
    }
    if let Some(processes) = args.processes.map(usize::from).or(file.processes) {
        config = config.with_concurrency(processes);
    }
    let connect_timeout_secs = file
        .connect_timeout_secs
        .unwrap_or(config.connect_timeout_secs);
    let read_timeout_secs = file.read_timeout_secs.unwrap_or(config.read_timeout_secs);
    config = config.with_timeouts(connect_timeout_secs, read_timeout_secs);
    if let Some(user_agent) = file.user_agent {
        config = config.with_user_agent(user_agent);
    }
    config
}
