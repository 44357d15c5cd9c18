use crate::config::{Config, WAREHOUSE_DATABASE, WAREHOUSE_NAME, WAREHOUSE_SCHEMA};
use crate::errors::{AppError, ResultExt};
use crate::loan_storage::{InsertStatement, Warehouse};
use crate::schema::ColumnValue;
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgConnectOptions};
use sqlx::query::Query;
use sqlx::{ConnectOptions, Connection, Postgres};

/// Warehouse reached over the Postgres wire protocol.
///
/// Holds connection parameters only. Every insert opens its own connection,
/// runs in its own transaction and closes the connection afterwards.
#[derive(Debug, Clone)]
pub struct PgWarehouse {
    options: PgConnectOptions,
}

impl PgWarehouse {
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }

    /// Connection parameters from the loaded configuration plus the
    /// hardcoded warehouse, database and schema.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let (host, port) = config.warehouse_endpoint()?;

        let options = PgConnectOptions::new()
            .host(&host)
            .port(port)
            .username(&config.warehouse_user)
            .password(&config.warehouse_password)
            .database(WAREHOUSE_DATABASE)
            .application_name(WAREHOUSE_NAME)
            .options([("search_path", WAREHOUSE_SCHEMA)]);

        tracing::info!(
            "Warehouse configured: {}:{} (database {}, schema {}, warehouse {})",
            host,
            port,
            WAREHOUSE_DATABASE,
            WAREHOUSE_SCHEMA,
            WAREHOUSE_NAME
        );

        Ok(Self::new(options))
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q ColumnValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        ColumnValue::Text(s) => query.bind(s.as_str()),
        ColumnValue::Float(f) => query.bind(*f),
        ColumnValue::Ordinal(i) => query.bind(*i),
        ColumnValue::Flag(b) => query.bind(*b),
        ColumnValue::Timestamp(t) => query.bind(*t),
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn execute_insert(&self, statement: &InsertStatement) -> Result<(), AppError> {
        let mut conn = self
            .options
            .connect()
            .await
            .context("Failed to connect to warehouse")?;

        let sql = statement.sql();
        let result = async {
            let mut tx = conn.begin().await.context("Failed to begin transaction")?;

            let query = statement
                .values()
                .iter()
                .fold(sqlx::query(&sql), bind_value);
            query
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to insert into {}", statement.table()))?;

            tx.commit().await.context("Failed to commit transaction")
        }
        .await;

        // Close on both paths; a close failure is only logged.
        if let Err(e) = conn.close().await {
            tracing::warn!("Failed to close warehouse connection: {}", e);
        }

        result
    }
}
