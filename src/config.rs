//! Settings used to build an instance of the application.

use rusqlite::Connection;
use time::Duration;

use crate::{Error, PasswordHash, auth::DEFAULT_COOKIE_DURATION};

/// The database path that opens a private, in-memory SQLite database.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// The configuration for creating the application with [crate::create_app].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// File path to the SQLite database, or [IN_MEMORY_DATABASE].
    pub database_path: String,
    /// The secret used to derive the key for signing and encrypting cookies.
    pub secret: String,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// How long a log-in session lasts without activity.
    pub cookie_duration: Duration,
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
}

impl Config {
    /// Create a config for the database at `database_path` with the default
    /// timezone (UTC), session duration and password hashing cost.
    pub fn new(database_path: &str, secret: &str) -> Self {
        Self {
            database_path: database_path.to_owned(),
            secret: secret.to_owned(),
            local_timezone: "Etc/UTC".to_owned(),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            password_hash_cost: PasswordHash::DEFAULT_COST,
        }
    }

    /// A config for tests: an in-memory database, a fixed secret and the
    /// cheapest password hashing cost.
    pub fn testing() -> Self {
        Self {
            password_hash_cost: PasswordHash::MIN_COST,
            ..Self::new(IN_MEMORY_DATABASE, "testing-secret")
        }
    }

    /// Set the local timezone, e.g. "Pacific/Auckland".
    pub fn with_local_timezone(mut self, local_timezone: &str) -> Self {
        self.local_timezone = local_timezone.to_owned();
        self
    }

    /// Open a connection to the configured database.
    ///
    /// # Errors
    ///
    /// Returns a [Error::SqlError] if the database could not be opened.
    pub fn open_database(&self) -> Result<Connection, Error> {
        let connection = if self.database_path == IN_MEMORY_DATABASE {
            Connection::open_in_memory()?
        } else {
            Connection::open(&self.database_path)?
        };

        Ok(connection)
    }
}
