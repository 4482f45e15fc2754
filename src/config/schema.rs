use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding `[bootstrap] admin_email`.
pub const ADMIN_EMAIL_ENV: &str = "SAFE_MOBILE_ADMIN_EMAIL";

/// Environment variable overriding `[bootstrap] admin_password`.
pub const ADMIN_PASSWORD_ENV: &str = "SAFE_MOBILE_ADMIN_PASSWORD";

/// Administrator email seeded when neither config nor environment names one.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@safemobile.com";

/// Default PBKDF2 rounds for stored passwords.
pub const DEFAULT_HASH_ITERATIONS: u32 = 100_000;

/// Lowest accepted PBKDF2 round count.
pub const MIN_HASH_ITERATIONS: u32 = 1_000;

/// Top-level vault configuration (`config.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was loaded from. Not serialized.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory holding `vault.db` and `session.json`.
    /// Supports `~` expansion.
    #[serde(default)]
    pub data_dir: Option<String>,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    #[serde(default)]
    pub hashing: HashingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// First-run administrator provisioning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Email of the administrator seeded into an empty vault.
    /// Falls back to [`DEFAULT_ADMIN_EMAIL`].
    #[serde(default)]
    pub admin_email: Option<String>,
    /// Password of the seeded administrator. When unset a one-time
    /// password is generated at seed time.
    #[serde(default)]
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingConfig {
    /// PBKDF2-HMAC-SHA256 rounds for newly stored passwords.
    #[serde(default = "default_hash_iterations")]
    pub iterations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_hash_iterations() -> u32 {
    DEFAULT_HASH_ITERATIONS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            iterations: default_hash_iterations(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            data_dir: None,
            bootstrap: BootstrapConfig::default(),
            hashing: HashingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "safemobile", "safe-mobile")
}

impl Config {
    /// Load from an explicit path, or from the platform config dir when
    /// `path` is `None`. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => project_dirs()
                .map(|dirs| dirs.config_dir().join("config.toml"))
                .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?,
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            Self::from_toml(&contents)?
        } else {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            Self::default()
        };
        config.config_path = config_path;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.hashing.iterations < MIN_HASH_ITERATIONS {
            bail!(
                "hashing.iterations must be at least {MIN_HASH_ITERATIONS}, got {}",
                self.hashing.iterations
            );
        }
        Ok(())
    }

    /// Resolved data directory (tilde-expanded).
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref raw) = self.data_dir {
            let expanded = shellexpand::tilde(raw);
            return Ok(PathBuf::from(expanded.as_ref()));
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }

    pub fn vault_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("vault.db"))
    }

    pub fn session_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("session.json"))
    }
}

impl BootstrapConfig {
    /// Apply `SAFE_MOBILE_ADMIN_EMAIL` / `SAFE_MOBILE_ADMIN_PASSWORD`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(
            std::env::var(ADMIN_EMAIL_ENV).ok(),
            std::env::var(ADMIN_PASSWORD_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, email: Option<String>, password: Option<String>) {
        if let Some(email) = email.filter(|v| !v.is_empty()) {
            self.admin_email = Some(email);
        }
        if let Some(password) = password.filter(|v| !v.is_empty()) {
            self.admin_password = Some(password);
        }
    }
}
