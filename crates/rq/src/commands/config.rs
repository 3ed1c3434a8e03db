//! `rq config`: the TOML file holding the card path and search defaults.
//!
//! The file lives at `~/.config/rq/config.toml` (or under
//! `$XDG_CONFIG_HOME`), unless `RQ_CONFIG` names another path.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandError, Result};

/// Schema version written by this build.
const CONFIG_VERSION: u32 = 1;

/// Environment variable overriding the config file path.
const CONFIG_ENV: &str = "RQ_CONFIG";

/// Keys accepted by `rq config set`.
const VALID_KEYS: &[&str] = &[
    "cards",
    "search.sort_by",
    "search.descending",
    "search.limit",
    "output.color",
];

/// Contents of `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Schema version; files without one are read as the current version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Card file to search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<PathBuf>,

    /// Search defaults.
    #[serde(default)]
    pub search: SearchConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            cards: None,
            search: SearchConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Search defaults, used when neither the query nor a flag says otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default sort field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    /// Default sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descending: Option<bool>,

    /// Default page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Returns `$XDG_CONFIG_HOME/rq`, falling back to `~/.config/rq`.
/// Uses XDG-style paths: ~/.config/rq/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("rq"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("rq"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Returns the config file path, honouring `RQ_CONFIG`.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Reads the config file. A missing file yields the defaults.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("cannot read {}: {e}", path.display())))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("invalid config {}: {e}", path.display())))?;

    migrate_config(config)
}

/// Brings an older file up to [`CONFIG_VERSION`].
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        log::warn!(
            "config version {} is newer than supported version {}",
            config.version,
            CONFIG_VERSION
        );
        return Ok(config);
    }

    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Writes `config` back, creating the directory if needed.
fn save_config(config: &Config) -> Result<()> {
    let path = get_config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CommandError::Config(format!("cannot create {}: {e}", parent.display()))
        })?;
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| CommandError::Config(format!("cannot encode config: {e}")))?;

    fs::write(&path, content)
        .map_err(|e| CommandError::Config(format!("cannot write {}: {e}", path.display())))?;

    Ok(())
}

/// `rq config show`
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if !path.exists() {
            println!("(No config file exists. Run 'rq config set <key> <value>' to create one.)");
            return Ok(());
        }

        if let Some(ref cards) = config.cards {
            println!("cards: {}", cards.display());
        }

        println!("\n[search]");
        if let Some(ref sort_by) = config.search.sort_by {
            println!("  sort_by: {}", sort_by);
        }
        if let Some(descending) = config.search.descending {
            println!("  descending: {}", descending);
        }
        if let Some(limit) = config.search.limit {
            println!("  limit: {}", limit);
        }

        println!("\n[output]");
        if let Some(color) = config.output.color {
            println!("  color: {}", color);
        }
    }

    Ok(())
}

/// Arguments of `rq config set`.
pub struct ConfigSetOptions {
    /// Configuration key.
    pub key: String,
    /// Configuration value.
    pub value: String,
}

/// Applies one `key = value` assignment to `config`.
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let (section, field) = match key.split_once('.') {
        Some((section, field)) => (Some(section), field),
        None => (None, key),
    };

    match (section, field) {
        (None, "cards") => {
            config.cards = Some(PathBuf::from(value));
        }
        (Some("search"), "sort_by") => {
            if value.trim().is_empty() {
                return Err(CommandError::Config("sort_by cannot be empty".to_string()));
            }
            config.search.sort_by = Some(value.to_string());
        }
        (Some("search"), "descending") => {
            config.search.descending = Some(parse_bool(value)?);
        }
        (Some("search"), "limit") => {
            config.search.limit = parse_limit(value)?;
        }
        (Some("output"), "color") => {
            config.output.color = Some(parse_bool(value)?);
        }
        _ => {
            return Err(CommandError::Config(format!(
                "Unknown config key '{}'. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )));
        }
    }

    Ok(())
}

/// `rq config set <key> <value>`
pub fn execute_set(ctx: &CommandContext, opts: &ConfigSetOptions) -> Result<()> {
    let mut config = load_config()?;
    let path = get_config_path()?;

    apply_setting(&mut config, &opts.key, &opts.value)?;
    save_config(&config)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "success",
            "key": opts.key,
            "value": opts.value,
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Set {} = {}", opts.key, opts.value);
    }

    Ok(())
}

/// `rq config path`
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Accepts true/false, yes/no, 1/0 and on/off, in any case.
fn parse_bool(s: &str) -> Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(CommandError::Config(format!(
            "expected a boolean (true/false, yes/no, 1/0, on/off), got '{s}'"
        ))),
    }
}

/// Parses a page size. `none` or `all` clears the limit.
fn parse_limit(s: &str) -> Result<Option<usize>> {
    match s.to_lowercase().as_str() {
        "none" | "all" => Ok(None),
        other => match other.parse::<usize>() {
            Ok(0) | Err(_) => Err(CommandError::Config(format!(
                "expected a positive limit or 'none', got '{s}'"
            ))),
            Ok(n) => Ok(Some(n)),
        },
    }
}
