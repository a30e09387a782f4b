//! Configuration types for bestiary
//!
//! Every constant the tool depends on (API location, selection limits, output
//! paths, chunk limits) lives here so each component receives it explicitly.
//! The defaults reproduce the values the generated data set was built with.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Monsters the consuming application already ships; the fetcher skips them.
pub const DEFAULT_EXCLUDED: &[&str] = &[
    "awakened-shrub",
    "giant-rat",
    "giant-bat",
    "stirge",
    "kobold",
    "goblin",
    "skeleton",
    "zombie",
    "wolf",
    "cultist",
    "bandit",
    "guard",
    "shadow",
    "dire-wolf",
    "giant-spider",
    "ghoul",
    "imp",
    "animated-armor",
    "orc",
    "specter",
    "brown-bear",
    "black-bear",
    "wight",
    "quasit",
    "hobgoblin",
    "bugbear",
    "hell-hound",
    "owlbear",
    "basilisk",
    "mimic",
    "cockatrice",
    "flying-sword",
    "awakened-tree",
    "fire-elemental",
    "earth-elemental",
    "young-red-dragon",
    "young-black-dragon",
];

/// Main configuration
///
/// Loaded from TOML with [`Config::from_file`]; every field has a default so an
/// empty file (or no file at all) is a valid configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Path of the JSON interchange document
    #[serde(default = "default_document_path")]
    pub document_path: PathBuf,

    /// Fetcher settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Emitter settings
    #[serde(default)]
    pub emit: EmitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document_path: default_document_path(),
            fetch: FetchConfig::default(),
            emit: EmitConfig::default(),
        }
    }
}

/// Fetcher settings (remote API, selection limits, pacing)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base URL of the SRD API, without trailing slash
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Number of new monsters to accept before stopping (default: 80)
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Pause after each accepted monster (default: 100 ms)
    #[serde(default = "default_request_delay", with = "duration_ms_serde")]
    pub request_delay: Duration,

    /// Per-request timeout (default: 30 s, 0 or None = wait forever)
    #[serde(
        default = "default_request_timeout",
        with = "optional_duration_ms_serde"
    )]
    pub request_timeout: Option<Duration>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Monster indices to skip
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Low challenge rating throttle
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Retry behavior for individual requests
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            target_count: default_target_count(),
            request_delay: default_request_delay(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            exclude: default_exclude(),
            throttle: ThrottleConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Skips easy monsters once enough have been accepted, biasing the document
/// toward harder content.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Ratings strictly below this are throttled (default: 3)
    #[serde(default = "default_throttle_below_rating")]
    pub below_rating: f64,

    /// Throttling starts once more than this many monsters were accepted (default: 40)
    #[serde(default = "default_throttle_after_accepted")]
    pub after_accepted: usize,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            below_rating: default_throttle_below_rating(),
            after_accepted: default_throttle_after_accepted(),
        }
    }
}

/// Retry configuration with exponential backoff
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 0, a failed request is final)
    #[serde(default)]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 500 ms)
    #[serde(default = "default_initial_delay", with = "duration_ms_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 10 seconds)
    #[serde(default = "default_max_delay", with = "duration_ms_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Emitter settings shared by the single-file and chunked emitters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmitConfig {
    /// Directory the generated modules are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Line budget per chunked file (default: 250)
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Lines reserved for the header and footer of a chunked file (default: 20)
    #[serde(default = "default_header_overhead")]
    pub header_overhead: usize,

    /// Extension of generated files, without the dot (default: "ts")
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Record type imported by every generated module (default: "Monster")
    #[serde(default = "default_type_name")]
    pub type_name: String,

    /// Module the record type is imported from (default: "./monsters")
    #[serde(default = "default_type_module")]
    pub type_module: String,

    /// Delete leftover chunk files of a band before writing it (default: false)
    #[serde(default)]
    pub prune_stale_parts: bool,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            max_lines: default_max_lines(),
            header_overhead: default_header_overhead(),
            file_extension: default_file_extension(),
            type_name: default_type_name(),
            type_module: default_type_module(),
            prune_stale_parts: false,
        }
    }
}

impl Config {
    /// Load and validate a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make a component misbehave
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.fetch.api_base)
            .map_err(|e| Error::config("fetch.api_base", format!("invalid URL: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::config(
                "fetch.api_base",
                format!("unsupported scheme {}", base.scheme()),
            ));
        }

        let multiplier = self.fetch.retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(Error::config(
                "fetch.retry.backoff_multiplier",
                "must be a finite number of at least 1.0",
            ));
        }

        if self.emit.max_lines == 0 {
            return Err(Error::config("emit.max_lines", "must be greater than zero"));
        }
        if self.emit.header_overhead >= self.emit.max_lines {
            return Err(Error::config(
                "emit.header_overhead",
                format!(
                    "header overhead {} leaves no room under max_lines {}",
                    self.emit.header_overhead, self.emit.max_lines
                ),
            ));
        }
        if self.emit.file_extension.is_empty() || self.emit.file_extension.contains('.') {
            return Err(Error::config(
                "emit.file_extension",
                "must be a bare extension such as \"ts\"",
            ));
        }

        Ok(())
    }
}

fn default_document_path() -> PathBuf {
    PathBuf::from("scripts/fetched_monsters.json")
}

fn default_api_base() -> String {
    "https://www.dnd5eapi.co/api/2014".to_string()
}

fn default_target_count() -> usize {
    80
}

fn default_request_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_request_timeout() -> Option<Duration> {
    Some(Duration::from_secs(30))
}

fn default_user_agent() -> String {
    concat!("bestiary/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_exclude() -> Vec<String> {
    DEFAULT_EXCLUDED.iter().map(|s| s.to_string()).collect()
}

fn default_throttle_below_rating() -> f64 {
    3.0
}

fn default_throttle_after_accepted() -> usize {
    40
}

fn default_initial_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("backend/src/data")
}

fn default_max_lines() -> usize {
    250
}

fn default_header_overhead() -> usize {
    20
}

fn default_file_extension() -> String {
    "ts".to_string()
}

fn default_type_name() -> String {
    "Monster".to_string()
}

fn default_type_module() -> String {
    "./monsters".to_string()
}

// Durations are written as integer milliseconds
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

mod optional_duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // 0 disables the timeout
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.filter(|&ms| ms > 0).map(Duration::from_millis))
    }
}
