//! Credential-based routing for the login surface.
//!
//! `login` picks the surface a granted user lands on; `register` is the
//! registration hint behind the same form. Any registration with non-empty
//! fields creates a record, including one whose email is already in use.

use crate::vault::{CredentialStore, NewUser, Role, UserRecord};
use anyhow::Result;

/// Shown on any login miss. Wrong email and wrong password are not distinguished.
pub const ACCESS_DENIED_MESSAGE: &str = "Vault Access Denied";

/// Shown after a record is created.
pub const REGISTERED_MESSAGE: &str = "User Vault Created";

/// Shown when registration is attempted with an empty field.
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Enter credentials first";

/// Surface a granted user is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Admin,
    Standard,
}

impl Destination {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Administrator => Self::Admin,
            Role::Standard => Self::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Standard => "standard",
        }
    }
}

#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Granted {
        user: UserRecord,
        destination: Destination,
    },
    /// Stay on the login surface.
    Denied,
}

impl LoginOutcome {
    pub fn destination(&self) -> Option<Destination> {
        match self {
            Self::Granted { destination, .. } => Some(*destination),
            Self::Denied => None,
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Granted { .. } => None,
            Self::Denied => Some(ACCESS_DENIED_MESSAGE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Created { id: i64 },
    MissingCredentials,
}

impl RegistrationOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Created { .. } => REGISTERED_MESSAGE,
            Self::MissingCredentials => MISSING_CREDENTIALS_MESSAGE,
        }
    }
}

pub struct SessionRouter<'a> {
    store: &'a CredentialStore,
}

impl<'a> SessionRouter<'a> {
    pub fn new(store: &'a CredentialStore) -> Self {
        Self { store }
    }

    pub fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        match self.store.login(email, password)? {
            Some(user) => {
                let destination = Destination::for_role(user.role);
                tracing::info!(
                    user_id = user.id,
                    destination = destination.as_str(),
                    "Vault access granted"
                );
                Ok(LoginOutcome::Granted { user, destination })
            }
            None => {
                tracing::warn!("Vault access denied");
                Ok(LoginOutcome::Denied)
            }
        }
    }

    /// Emptiness is the only check. Format and duplicates are not validated.
    pub fn register(&self, email: &str, password: &str) -> Result<RegistrationOutcome> {
        if email.is_empty() || password.is_empty() {
            return Ok(RegistrationOutcome::MissingCredentials);
        }

        let id = self.store.insert_user(&NewUser {
            email,
            password,
            role: Role::Standard,
        })?;
        tracing::info!(user_id = id, "User vault created");
        Ok(RegistrationOutcome::Created { id })
    }
}
