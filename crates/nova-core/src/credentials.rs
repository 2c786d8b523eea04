//! Local account store: one SQLite table of (username, password hash).
//!
//! Every operation opens its own connection; there is no pooled handle and no transaction
//! spanning calls. Uniqueness of `username` is enforced by the table itself.

use std::path::{Path, PathBuf};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension};

use crate::error::{NovaError, NovaResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL
);
"#;

/// Returned by a successful signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub id: i64,
    pub username: String,
}

/// Returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    db_path: PathBuf,
}

impl CredentialStore {
    /// Create the store and make sure the schema exists.
    pub fn new(db_path: impl Into<PathBuf>) -> NovaResult<Self> {
        let this = Self {
            db_path: db_path.into(),
        };
        this.init()?;
        Ok(this)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> NovaResult<Connection> {
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        // The file may have been replaced since start-up.
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    fn init(&self) -> NovaResult<()> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.open()?;
        Ok(())
    }

    /// Persist a new user with a salted Argon2id hash.
    pub fn create(&self, username: &str, password: &str) -> NovaResult<Created> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(NovaError::InvalidInput(
                "username and password required".to_string(),
            ));
        }
        let hash = hash_password(password)?;
        let conn = self.open()?;
        match conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, hash],
        ) {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(NovaError::DuplicateUser(username.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!("Created user {}", username);
        Ok(Created {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
        })
    }

    /// Check a username/password pair against the stored hash.
    pub fn verify(&self, username: &str, password: &str) -> NovaResult<Authenticated> {
        let username = username.trim();
        let conn = self.open()?;
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, password_hash FROM users WHERE username = ?1",
                params![username],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        let (id, stored) = row.ok_or(NovaError::UserNotFound)?;
        if !password_matches(password, &stored) {
            return Err(NovaError::InvalidCredentials);
        }
        Ok(Authenticated {
            id,
            username: username.to_string(),
        })
    }

    pub fn count(&self) -> NovaResult<i64> {
        let conn = self.open()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?)
    }
}

fn hash_password(password: &str) -> NovaResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(hash_failure)
}

/// Hashing failures are server faults, never the caller's.
fn hash_failure(err: argon2::password_hash::Error) -> NovaError {
    NovaError::Io(std::io::Error::other(format!("cannot hash password: {err}")))
}

fn password_matches(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("stored password hash is unreadable: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CredentialStore::new(dir.path().join("users.db")).expect("store");
        (dir, store)
    }

    #[test]
    fn create_then_verify_succeeds() {
        let (_dir, store) = store();
        let created = store.create("alice", "pw1").expect("create");
        let auth = store.verify("alice", "pw1").expect("verify");
        assert_eq!(created.id, auth.id);
        assert_eq!(auth.username, "alice");
    }

    #[test]
    fn password_is_not_stored_in_plaintext() {
        let (_dir, store) = store();
        store.create("bob", "hunter2").expect("create");
        let conn = Connection::open(store.path()).expect("open");
        let hash: String = conn
            .query_row("SELECT password_hash FROM users WHERE username = 'bob'", [], |r| r.get(0))
            .expect("row");
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("hunter2"));
    }

    #[test]
    fn duplicate_username_is_rejected_regardless_of_password() {
        let (_dir, store) = store();
        store.create("alice", "pw1").expect("create");
        let err = store.create("alice", "other").expect_err("duplicate");
        assert!(matches!(err, NovaError::DuplicateUser(ref u) if u == "alice"));
        assert_eq!(store.count().expect("count"), 1);
    }

    #[test]
    fn wrong_password_and_unknown_user_are_distinguished() {
        let (_dir, store) = store();
        store.create("alice", "pw1").expect("create");
        assert!(matches!(
            store.verify("alice", "wrong"),
            Err(NovaError::InvalidCredentials)
        ));
        assert!(matches!(
            store.verify("mallory", "pw1"),
            Err(NovaError::UserNotFound)
        ));
    }

    #[test]
    fn empty_fields_are_invalid_input() {
        let (_dir, store) = store();
        assert!(matches!(store.create("", "pw"), Err(NovaError::InvalidInput(_))));
        assert!(matches!(store.create("carol", ""), Err(NovaError::InvalidInput(_))));
        assert_eq!(store.count().expect("count"), 0);
    }

    #[test]
    fn hashing_failure_is_a_server_error() {
        let err = hash_failure(argon2::password_hash::Error::SaltInvalid(
            argon2::password_hash::errors::InvalidValue::TooShort,
        ));
        assert!(matches!(err, NovaError::Io(_)));
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("cannot hash password"));
    }

    #[test]
    fn schema_is_recreated_when_file_is_removed() {
        let (_dir, store) = store();
        std::fs::remove_file(store.path()).expect("remove");
        store.create("dave", "pw").expect("create after removal");
        assert!(store.verify("dave", "pw").is_ok());
    }
}
