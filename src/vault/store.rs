//! SQLite-backed credential store.
//!
//! Table `users`: id, email, password, role, isLocked, lastLat, lastLng,
//! batteryLevel. The `password` column holds an encoded salted hash (see
//! [`super::password`]), never the submitted secret.
//!
//! Email is a lookup key but is not unique: registering the same address
//! twice yields two rows. Login walks candidates in ascending id order and
//! the first hash that verifies wins.

use super::password::{dummy_verify, hash_password, verify_password};
use crate::config::schema::DEFAULT_HASH_ITERATIONS;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Battery level assigned to new records.
const DEFAULT_BATTERY_LEVEL: i32 = 100;

/// Post-login destination selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "USER")]
    Standard,
    #[serde(rename = "ADMIN")]
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "USER",
            Self::Administrator => "ADMIN",
        }
    }

    /// Anything other than `ADMIN` reads back as a standard user.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "ADMIN" => Self::Administrator,
            _ => Self::Standard,
        }
    }
}

/// One row of the `users` table.
#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    /// Stored but not consulted by login.
    pub is_locked: bool,
    /// Never written by any flow.
    pub last_lat: f64,
    pub last_lng: f64,
    pub battery_level: i32,
}

/// Insertion input. The store hashes `password` before writing.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

const SELECT_COLUMNS: &str =
    "id, email, password, role, isLocked, lastLat, lastLng, batteryLevel";

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    let role: String = row.get(3)?;
    Ok(UserRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        role: Role::from_str_lossy(&role),
        is_locked: row.get(4)?,
        last_lat: row.get(5)?,
        last_lng: row.get(6)?,
        battery_level: row.get(7)?,
    })
}

/// SQLite-backed credential store.
pub struct CredentialStore {
    conn: Mutex<Connection>,
    hash_iterations: u32,
}

impl CredentialStore {
    /// Open (or create) the vault database at the given path.
    pub fn open(db_path: &Path, hash_iterations: Option<u32>) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create vault dir: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open vault DB: {}", db_path.display()))?;

        // WAL mode for crash safety
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        Self::with_connection(conn, hash_iterations)
    }

    /// Throwaway store for tests and dry runs.
    pub fn open_in_memory(hash_iterations: Option<u32>) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, hash_iterations)
    }

    fn with_connection(conn: Connection, hash_iterations: Option<u32>) -> Result<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            hash_iterations: hash_iterations.unwrap_or(DEFAULT_HASH_ITERATIONS),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                email        TEXT NOT NULL,
                password     TEXT NOT NULL,
                role         TEXT NOT NULL DEFAULT 'USER',
                isLocked     INTEGER NOT NULL DEFAULT 0,
                lastLat      REAL NOT NULL DEFAULT 0,
                lastLng      REAL NOT NULL DEFAULT 0,
                batteryLevel INTEGER NOT NULL DEFAULT 100
            );
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);",
        )?;
        Ok(())
    }

    /// Find the record matching `email` exactly whose hash verifies `password`.
    ///
    /// No trimming or case folding is applied to either value.
    pub fn login(&self, email: &str, password: &str) -> Result<Option<UserRecord>> {
        let candidates = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM users WHERE email = ?1 ORDER BY id ASC"
            ))?;
            let rows = stmt
                .query_map(params![email], row_to_user)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        if candidates.is_empty() {
            dummy_verify(password, self.hash_iterations);
            return Ok(None);
        }

        Ok(candidates
            .into_iter()
            .find(|user| verify_password(password, &user.password_hash)))
    }

    /// Every record, ordered by id.
    pub fn all_users(&self) -> Result<Vec<UserRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM users ORDER BY id ASC"
        ))?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Look up a record by id.
    pub fn get_user(&self, id: i64) -> Result<Option<UserRecord>> {
        let conn = self.conn.lock();
        let row = conn.query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        );

        match row {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a record unconditionally. Returns the new id.
    pub fn insert_user(&self, user: &NewUser<'_>) -> Result<i64> {
        let password_hash = hash_password(user.password, self.hash_iterations);

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (email, password, role, isLocked, lastLat, lastLng, batteryLevel)
             VALUES (?1, ?2, ?3, 0, 0, 0, ?4)",
            params![
                user.email,
                password_hash,
                user.role.as_str(),
                DEFAULT_BATTERY_LEVEL
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, role = user.role.as_str(), "User record inserted");
        Ok(id)
    }

    /// Overwrite the mutable columns of the record with `user.id`.
    /// Returns `false` when no such record exists.
    pub fn update_user(&self, user: &UserRecord) -> Result<bool> {
        let conn = self.conn.lock();
        let updated = conn.execute(
            "UPDATE users SET
                email = ?2,
                password = ?3,
                role = ?4,
                isLocked = ?5,
                lastLat = ?6,
                lastLng = ?7,
                batteryLevel = ?8
             WHERE id = ?1",
            params![
                user.id,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.is_locked,
                user.last_lat,
                user.last_lng,
                user.battery_level,
            ],
        )?;
        Ok(updated > 0)
    }

    /// Count stored records.
    pub fn user_count(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
