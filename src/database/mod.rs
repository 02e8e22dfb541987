//! Database sessions.
//!
//! A [`Connector`] opens one [`Session`] per load job. The session runs exactly two units
//! of work, each committed on its own: the `CREATE TABLE` statement, then all row inserts.
//! [`with_session`] scopes a session to one closure so it is closed on every exit path.
//!
//! Backends:
//!
//! - [`postgres`] (cargo feature `postgres`): the synchronous `postgres` client
//! - [`sqlite`] (cargo feature `sqlite`): `rusqlite` with a bundled libsqlite3

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BoxError, LoadError, LoadResult};
use crate::types::{InferredType, Value};

#[cfg(feature = "postgres")]
pub use self::postgres::{PostgresConnector, PostgresSession};
#[cfg(feature = "sqlite")]
pub use self::sqlite::{SqliteConnector, SqliteSession};

/// Connection parameters shared by every job of one run.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub dbname: String,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Give up establishing a session after this many seconds.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

impl ConnectionParams {
    /// Parameters for `dbname` on `localhost:5432`.
    pub fn new(dbname: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            dbname: dbname.into(),
            user: user.into(),
            password: None,
            connect_timeout_secs: None,
        }
    }

    /// Human-readable target, without the password.
    pub fn target(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.user, self.host, self.port, self.dbname
        )
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password_set", &self.password.is_some())
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// One open database session.
pub trait Session {
    /// Placeholder for the 1-based parameter `index` in this backend's dialect.
    fn placeholder(&self, index: usize) -> String;

    /// Execute `sql` in its own transaction and commit.
    fn execute_and_commit(&mut self, sql: &str) -> Result<(), BoxError>;

    /// Prepare `sql` once, execute it for every row in one transaction, then commit.
    ///
    /// `column_types` carries the inferred type of each parameter position. Returns the number
    /// of rows inserted.
    fn insert_and_commit(
        &mut self,
        sql: &str,
        column_types: &[InferredType],
        rows: &[Vec<Value>],
    ) -> Result<u64, BoxError>;
}

/// Opens sessions against one database.
pub trait Connector {
    type Session: Session;

    /// Description of the database for messages (never includes credentials).
    fn target(&self) -> String;

    /// Establish a new session.
    fn connect(&self) -> Result<Self::Session, BoxError>;
}

/// Open a session, run `f` with it, then close it.
///
/// The session is dropped when `f` returns, whether it succeeded or not; any transaction left
/// open by a failed statement is rolled back by the backend on drop.
pub fn with_session<C, T, F>(connector: &C, f: F) -> LoadResult<T>
where
    C: Connector,
    F: FnOnce(&mut C::Session) -> LoadResult<T>,
{
    let mut session = connector
        .connect()
        .map_err(|source| LoadError::Connection {
            target: connector.target(),
            source,
        })?;
    let out = f(&mut session);
    drop(session);
    out
}

#[cfg(test)]
mod tests {
    use super::ConnectionParams;

    #[test]
    fn debug_output_hides_password() {
        let mut params = ConnectionParams::new("Democracy_Index_Portfolio", "postgres");
        params.password = Some("hunter2".to_string());

        let debug = format!("{params:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("password_set: true"));
        assert_eq!(
            params.target(),
            "postgres://postgres@localhost:5432/Democracy_Index_Portfolio"
        );
    }

    #[test]
    fn host_and_port_default_when_omitted() {
        let params: ConnectionParams =
            serde_json::from_str(r#"{"dbname": "db", "user": "loader"}"#).unwrap();
        assert_eq!(params.host, "localhost");
        assert_eq!(params.port, 5432);
        assert_eq!(params.password, None);
    }
}
