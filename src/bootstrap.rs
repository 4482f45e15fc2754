//! First-run administrator provisioning.
//!
//! When the vault is empty one ADMINISTRATOR record is created from
//! `[bootstrap]` config (or `SAFE_MOBILE_ADMIN_EMAIL` /
//! `SAFE_MOBILE_ADMIN_PASSWORD`). This is a standing privileged account
//! created without any interactive step, so whoever controls the config or
//! environment at first launch controls the vault.
//!
//! Without a configured email the seed uses `DEFAULT_ADMIN_EMAIL`. Without a
//! configured password a random one is generated and handed back to the
//! caller exactly once; it is never logged.

use crate::config::schema::DEFAULT_ADMIN_EMAIL;
use crate::config::BootstrapConfig;
use crate::vault::{CredentialStore, NewUser, Role};
use anyhow::Result;

/// Random bytes behind a generated password (hex-encoded, 24 chars).
const GENERATED_PASSWORD_BYTES: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded {
        id: i64,
        email: String,
        /// Set only when the password was generated here.
        generated_password: Option<String>,
    },
    AlreadyProvisioned,
}

/// Seed the administrator if the store is empty. Safe to call on every start.
pub fn seed_admin(store: &CredentialStore, config: &BootstrapConfig) -> Result<SeedOutcome> {
    if store.user_count()? > 0 {
        tracing::debug!("Vault already provisioned, skipping admin seed");
        return Ok(SeedOutcome::AlreadyProvisioned);
    }

    let email = config
        .admin_email
        .as_deref()
        .filter(|email| !email.is_empty())
        .unwrap_or(DEFAULT_ADMIN_EMAIL);

    let (password, generated_password) = match config
        .admin_password
        .as_deref()
        .filter(|password| !password.is_empty())
    {
        Some(password) => (password.to_string(), None),
        None => {
            let generated = generate_password();
            (generated.clone(), Some(generated))
        }
    };

    let id = store.insert_user(&NewUser {
        email,
        password: &password,
        role: Role::Administrator,
    })?;
    tracing::warn!(
        user_id = id,
        generated = generated_password.is_some(),
        "Seeded bootstrap administrator into empty vault"
    );

    Ok(SeedOutcome::Seeded {
        id,
        email: email.to_string(),
        generated_password,
    })
}

fn generate_password() -> String {
    let bytes: [u8; GENERATED_PASSWORD_BYTES] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::open_in_memory(Some(1_000)).unwrap()
    }

    fn configured() -> BootstrapConfig {
        BootstrapConfig {
            admin_email: Some("root@safe.test".into()),
            admin_password: Some("configured-pass".into()),
        }
    }

    #[test]
    fn seeds_exactly_one_admin_into_empty_store() {
        let store = store();

        let outcome = seed_admin(&store, &configured()).unwrap();
        let SeedOutcome::Seeded {
            email,
            generated_password,
            ..
        } = outcome
        else {
            panic!("expected a seed");
        };
        assert_eq!(email, "root@safe.test");
        assert!(generated_password.is_none());

        let users = store.all_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Administrator);
        assert!(store
            .login("root@safe.test", "configured-pass")
            .unwrap()
            .is_some());
    }

    #[test]
    fn second_start_does_nothing() {
        let store = store();
        seed_admin(&store, &configured()).unwrap();
        assert_eq!(
            seed_admin(&store, &configured()).unwrap(),
            SeedOutcome::AlreadyProvisioned
        );
        assert_eq!(store.user_count().unwrap(), 1);
    }

    #[test]
    fn non_empty_store_is_left_alone() {
        let store = store();
        store
            .insert_user(&NewUser {
                email: "u@safe.test",
                password: "pw",
                role: Role::Standard,
            })
            .unwrap();

        assert_eq!(
            seed_admin(&store, &configured()).unwrap(),
            SeedOutcome::AlreadyProvisioned
        );
        assert!(store
            .all_users()
            .unwrap()
            .iter()
            .all(|u| u.role == Role::Standard));
    }

    #[test]
    fn missing_password_is_generated() {
        let store = store();
        let config = BootstrapConfig {
            admin_email: Some("root@safe.test".into()),
            admin_password: None,
        };

        let SeedOutcome::Seeded {
            generated_password: Some(password),
            ..
        } = seed_admin(&store, &config).unwrap()
        else {
            panic!("expected a generated password");
        };
        assert_eq!(password.len(), GENERATED_PASSWORD_BYTES * 2);
        assert!(store.login("root@safe.test", &password).unwrap().is_some());
    }

    #[test]
    fn unconfigured_bootstrap_uses_default_email_and_generated_password() {
        let store = store();

        let SeedOutcome::Seeded {
            email,
            generated_password: Some(password),
            ..
        } = seed_admin(&store, &BootstrapConfig::default()).unwrap()
        else {
            panic!("expected a seed with a generated password");
        };
        assert_eq!(email, DEFAULT_ADMIN_EMAIL);

        let users = store.all_users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Administrator);
        assert!(store.login(DEFAULT_ADMIN_EMAIL, &password).unwrap().is_some());
    }

    #[test]
    fn empty_configured_email_falls_back_to_default() {
        let store = store();
        let config = BootstrapConfig {
            admin_email: Some(String::new()),
            admin_password: Some("pw".into()),
        };
        let SeedOutcome::Seeded { email, .. } = seed_admin(&store, &config).unwrap() else {
            panic!("expected a seed");
        };
        assert_eq!(email, DEFAULT_ADMIN_EMAIL);
    }

    #[test]
    fn missing_email_is_fine_once_provisioned() {
        let store = store();
        seed_admin(&store, &configured()).unwrap();
        assert_eq!(
            seed_admin(&store, &BootstrapConfig::default()).unwrap(),
            SeedOutcome::AlreadyProvisioned
        );
    }
}
