//! PostgreSQL sessions over the synchronous `postgres` client.

use std::time::Duration;

use chrono::NaiveDateTime;
use postgres::types::ToSql;
use postgres::{Client, Config, NoTls};

use crate::error::BoxError;
use crate::types::{InferredType, Value};

use super::{ConnectionParams, Connector, Session};

/// Opens plain-TCP sessions described by [`ConnectionParams`].
#[derive(Debug, Clone)]
pub struct PostgresConnector {
    params: ConnectionParams,
}

impl PostgresConnector {
    pub fn new(params: ConnectionParams) -> Self {
        Self { params }
    }
}

impl Connector for PostgresConnector {
    type Session = PostgresSession;

    fn target(&self) -> String {
        self.params.target()
    }

    fn connect(&self) -> Result<PostgresSession, BoxError> {
        let p = &self.params;
        let mut config = Config::new();
        config
            .host(&p.host)
            .port(p.port)
            .dbname(&p.dbname)
            .user(&p.user);
        if let Some(password) = &p.password {
            config.password(password);
        }
        if let Some(secs) = p.connect_timeout_secs {
            config.connect_timeout(Duration::from_secs(secs));
        }
        let client = config.connect(NoTls)?;
        Ok(PostgresSession { client })
    }
}

/// An open PostgreSQL session. Dropping it closes the connection.
pub struct PostgresSession {
    client: Client,
}

impl Session for PostgresSession {
    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn execute_and_commit(&mut self, sql: &str) -> Result<(), BoxError> {
        let mut tx = self.client.transaction()?;
        tx.batch_execute(sql)?;
        tx.commit()?;
        Ok(())
    }

    fn insert_and_commit(
        &mut self,
        sql: &str,
        column_types: &[InferredType],
        rows: &[Vec<Value>],
    ) -> Result<u64, BoxError> {
        let mut tx = self.client.transaction()?;
        let stmt = tx.prepare(sql)?;
        let mut inserted = 0;
        for row in rows {
            let params = row
                .iter()
                .zip(column_types)
                .map(|(value, data_type)| bind(value, *data_type))
                .collect::<Result<Vec<_>, _>>()?;
            let refs: Vec<&(dyn ToSql + Sync)> = params.iter().map(|p| &**p).collect();
            inserted += tx.execute(&stmt, &refs)?;
        }
        tx.commit()?;
        Ok(inserted)
    }
}

/// Box a value as the Rust type matching its column's storage type.
///
/// `INT` is a 4-byte integer, so wider values are rejected here rather than by the server.
fn bind(value: &Value, data_type: InferredType) -> Result<Box<dyn ToSql + Sync>, BoxError> {
    let boxed: Box<dyn ToSql + Sync> = match (value, data_type) {
        (Value::Null, InferredType::Integer) => Box::new(None::<i32>),
        (Value::Null, InferredType::Float) => Box::new(None::<f64>),
        (Value::Null, InferredType::Timestamp) => Box::new(None::<NaiveDateTime>),
        (Value::Null, InferredType::Text | InferredType::Generic) => Box::new(None::<String>),
        (Value::Int64(v), _) => {
            let v = i32::try_from(*v).map_err(|_| format!("value {v} out of range for INT"))?;
            Box::new(v)
        }
        (Value::Float64(v), _) => Box::new(*v),
        (Value::Timestamp(ts), _) => Box::new(*ts),
        (Value::Utf8(s), _) => Box::new(s.clone()),
    };
    Ok(boxed)
}

#[cfg(test)]
mod tests {
    use super::bind;
    use crate::types::{InferredType, Value};

    #[test]
    fn integers_wider_than_int_are_rejected() {
        assert!(bind(&Value::Int64(331_000_000), InferredType::Integer).is_ok());
        let err = bind(&Value::Int64(8_000_000_000), InferredType::Integer)
            .err()
            .unwrap();
        assert!(err.to_string().contains("out of range for INT"));
    }

    #[test]
    fn nulls_bind_for_every_type() {
        for t in [
            InferredType::Integer,
            InferredType::Float,
            InferredType::Timestamp,
            InferredType::Text,
            InferredType::Generic,
        ] {
            assert!(bind(&Value::Null, t).is_ok());
        }
    }
}
