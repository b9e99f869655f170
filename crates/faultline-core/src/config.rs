//! Configuration for the capture pipeline.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, defaults, and a builder pattern for
//! programmatic use. The embedding application normally overrides the
//! `client` section with its own page URL and user agent.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration for Faultline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub collector: CollectorConfig,
    pub client: ClientConfig,
    pub debounce: DebounceConfig,
    pub signatures: SignaturesConfig,
}

/// Remote collector settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Endpoint the JSON report is POSTed to.
    pub endpoint: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Identity of the capturing client, attached to every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Page location reported as `url`.
    pub page_url: String,
    /// Client identification string reported as `userAgent`.
    pub user_agent: String,
}

/// Near-duplicate suppression settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Sliding window (per key) in milliseconds.
    pub window_ms: u64,
    /// Table size above which stale entries are pruned on insert.
    pub max_tracked_keys: usize,
}

/// Severe framework-defect signatures matched against diagnostic output.
///
/// The list is substring-matched and framework-specific; the defaults
/// target the React diagnostics the original web client watched for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignaturesConfig {
    pub patterns: Vec<String>,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/faultline/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("faultline")
            .join("config.yaml")
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000/api/client-errors".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            page_url: "app://local".to_string(),
            user_agent: concat!("faultline/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            window_ms: 5_000,
            max_tracked_keys: 100,
        }
    }
}

impl Default for SignaturesConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                "Maximum update depth exceeded".to_string(),
                "Too many re-renders".to_string(),
                "Rendered more hooks than during the previous render".to_string(),
                "Encountered two children with the same key".to_string(),
                "Objects are not valid as a React child".to_string(),
            ],
        }
    }
}

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"debounce.window_ms"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.collector.endpoint.is_empty() {
            errors.push(ValidationError {
                field: "collector.endpoint".into(),
                message: "must not be empty".into(),
            });
        }
        if self.collector.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "collector.timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        if self.client.user_agent.is_empty() {
            errors.push(ValidationError {
                field: "client.user_agent".into(),
                message: "must not be empty".into(),
            });
        }

        if self.debounce.window_ms == 0 {
            errors.push(ValidationError {
                field: "debounce.window_ms".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.debounce.max_tracked_keys == 0 {
            errors.push(ValidationError {
                field: "debounce.max_tracked_keys".into(),
                message: "must be greater than 0".into(),
            });
        }

        // An empty signature list is valid; it disables the diagnostic
        // capture point. Empty patterns would match everything.
        for (i, pattern) in self.signatures.patterns.iter().enumerate() {
            if pattern.is_empty() {
                errors.push(ValidationError {
                    field: format!("signatures.patterns[{i}]"),
                    message: "must not be empty".into(),
                });
            }
        }

        errors
    }
}

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust
/// use faultline_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .collector_endpoint("https://api.example.com/client-errors")
///     .client_page_url("https://app.example.com/notes")
///     .debounce_window_ms(5_000)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- collector ---

    pub fn collector_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.collector.endpoint = endpoint.into();
        self
    }

    pub fn collector_timeout_secs(mut self, secs: u64) -> Self {
        self.config.collector.timeout_secs = secs;
        self
    }

    // --- client ---

    pub fn client_page_url(mut self, url: impl Into<String>) -> Self {
        self.config.client.page_url = url.into();
        self
    }

    pub fn client_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.client.user_agent = agent.into();
        self
    }

    // --- debounce ---

    pub fn debounce_window_ms(mut self, ms: u64) -> Self {
        self.config.debounce.window_ms = ms;
        self
    }

    pub fn debounce_max_tracked_keys(mut self, n: usize) -> Self {
        self.config.debounce.max_tracked_keys = n;
        self
    }

    // --- signatures ---

    /// Replace the signature list wholesale.
    pub fn signature_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.signatures.patterns = patterns;
        self
    }

    /// Append one signature to the list.
    pub fn add_signature(mut self, pattern: impl Into<String>) -> Self {
        self.config.signatures.patterns.push(pattern.into());
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
