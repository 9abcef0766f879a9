use anyhow::{Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub profiles: ProfilesConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub fixtures: FixturesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_search_path")]
    pub search_path: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            search_path: default_search_path(),
        }
    }
}

fn default_search_path() -> Vec<String> {
    vec!["internal".to_string(), "api".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProfilesConfig {
    #[serde(default = "default_email_domain")]
    pub email_domain: String,
    #[serde(default = "default_password_cost")]
    pub password_cost: u32,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            email_domain: default_email_domain(),
            password_cost: default_password_cost(),
        }
    }
}

fn default_email_domain() -> String {
    "gnome.org".to_string()
}
fn default_password_cost() -> u32 {
    8
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    #[serde(default = "default_extension")]
    pub default_extension: String,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            default_extension: default_extension(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_extension() -> String {
    "jpg".to_string()
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

fn default_seed() -> u64 {
    42
}

#[derive(Debug, Deserialize, Clone)]
pub struct FixturesConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_max_fridge_items")]
    pub max_fridge_items: usize,
    #[serde(default = "default_plannings_per_author")]
    pub plannings_per_author: usize,
    #[serde(default = "default_max_menus_per_planning")]
    pub max_menus_per_planning: usize,
    #[serde(default = "default_max_recipes_per_menu")]
    pub max_recipes_per_menu: usize,
    #[serde(default = "default_expiry_spread_days")]
    pub expiry_spread_days: i64,
}

impl Default for FixturesConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_fridge_items: default_max_fridge_items(),
            plannings_per_author: default_plannings_per_author(),
            max_menus_per_planning: default_max_menus_per_planning(),
            max_recipes_per_menu: default_max_recipes_per_menu(),
            expiry_spread_days: default_expiry_spread_days(),
        }
    }
}

fn default_enabled() -> bool {
    true
}
fn default_max_fridge_items() -> usize {
    30
}
fn default_plannings_per_author() -> usize {
    2
}
fn default_max_menus_per_planning() -> usize {
    5
}
fn default_max_recipes_per_menu() -> usize {
    5
}
fn default_expiry_spread_days() -> i64 {
    100
}

/// Load and validate a configuration file. Without a path, the defaults apply.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            parse_config(&content)?
        }
        None => Config::default(),
    };
    validate(&config)?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).with_context(|| "Failed to parse config file")
}

pub fn validate(config: &Config) -> Result<()> {
    // Validate profiles
    if !(4..=31).contains(&config.profiles.password_cost) {
        anyhow::bail!("profiles.password_cost must be in [4, 31]");
    }
    if config.profiles.email_domain.trim().is_empty() {
        anyhow::bail!("profiles.email_domain must not be empty");
    }

    // Validate media
    let ext = &config.media.default_extension;
    if ext.is_empty() || ext.starts_with('.') {
        anyhow::bail!(
            "media.default_extension must be non-empty and have no leading dot, got '{}'",
            ext
        );
    }
    for pattern in config
        .media
        .include_globs
        .iter()
        .chain(&config.media.exclude_globs)
    {
        Glob::new(pattern).with_context(|| format!("Invalid media glob: '{}'", pattern))?;
    }

    // Validate fixtures
    if config.fixtures.expiry_spread_days < 0 {
        anyhow::bail!("fixtures.expiry_spread_days must be >= 0");
    }

    Ok(())
}
