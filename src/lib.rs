#![forbid(unsafe_code)]

//! Safe Mobile local vault.
//!
//! - `vault`: SQLite credential store with salted password hashes
//! - `session`: role-based login routing, registration, signed-in marker
//! - `bootstrap`: first-run administrator provisioning
//! - `device_admin`: device-administration enable/disable notifications
//! - `config`: TOML configuration with environment overrides

pub mod bootstrap;
pub mod config;
pub mod device_admin;
pub mod session;
pub mod vault;

use anyhow::Result;
use bootstrap::SeedOutcome;
use config::Config;
use vault::CredentialStore;

/// Open the configured vault and run the first-run seeder.
///
/// Environment overrides for the bootstrap credential are applied here.
pub fn start(config: &Config) -> Result<(CredentialStore, SeedOutcome)> {
    let store = CredentialStore::open(&config.vault_path()?, Some(config.hashing.iterations))?;
    let mut bootstrap = config.bootstrap.clone();
    bootstrap.apply_env_overrides();
    let seeded = bootstrap::seed_admin(&store, &bootstrap)?;
    Ok((store, seeded))
}
