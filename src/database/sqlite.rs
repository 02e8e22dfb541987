//! SQLite sessions over `rusqlite`.
//!
//! SQLite accepts the same generated DDL (`INT`, `FLOAT`, `VARCHAR`, `TIMESTAMP`, `TEXT` map
//! onto its type affinities), which makes it a convenient local target.

use std::path::{Path, PathBuf};

use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{Connection, params_from_iter};

use crate::error::BoxError;
use crate::types::{InferredType, Value};

use super::{Connector, Session};

/// Text layout used for timestamps stored in SQLite.
pub const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Opens sessions on a database file.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    path: PathBuf,
}

impl SqliteConnector {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Connector for SqliteConnector {
    type Session = SqliteSession;

    fn target(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }

    fn connect(&self) -> Result<SqliteSession, BoxError> {
        let conn = Connection::open(&self.path)?;
        Ok(SqliteSession { conn })
    }
}

/// An open SQLite session. Dropping it closes the database handle.
pub struct SqliteSession {
    conn: Connection,
}

impl Session for SqliteSession {
    fn placeholder(&self, index: usize) -> String {
        format!("?{index}")
    }

    fn execute_and_commit(&mut self, sql: &str) -> Result<(), BoxError> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_and_commit(
        &mut self,
        sql: &str,
        _column_types: &[InferredType],
        rows: &[Vec<Value>],
    ) -> Result<u64, BoxError> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0u64;
        {
            let mut stmt = tx.prepare(sql)?;
            for row in rows {
                inserted += stmt.execute(params_from_iter(row.iter()))? as u64;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Int64(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            Value::Float64(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            Value::Timestamp(ts) => {
                ToSqlOutput::Owned(SqlValue::Text(ts.format(SQLITE_TIMESTAMP_FORMAT).to_string()))
            }
            Value::Utf8(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}
