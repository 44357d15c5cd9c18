use crate::errors::AppError;
use crate::models::LoanRecord;
use crate::schema::{ColumnValue, ID_COLUMN, LOAN_COLUMNS, SUBMITTED_AT_COLUMN};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// A single-row parameterized insert built from the attributes a record
/// actually carries.
///
/// Columns and values are stored side by side so the two lists cannot drift;
/// the placeholder list is derived from the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    table: String,
    columns: Vec<&'static str>,
    values: Vec<ColumnValue>,
}

impl InsertStatement {
    /// Builds the insert for one submission.
    ///
    /// `ID` and `SUBMITTED_AT` always lead; catalog columns follow in
    /// declaration order, skipping every attribute the record does not carry.
    pub fn for_record(
        table: impl Into<String>,
        loan_id: Uuid,
        submitted_at: DateTime<Utc>,
        record: &LoanRecord,
    ) -> Self {
        let mut columns = vec![ID_COLUMN, SUBMITTED_AT_COLUMN];
        let mut values = vec![
            ColumnValue::Text(loan_id.to_string()),
            ColumnValue::Timestamp(submitted_at),
        ];

        for column in LOAN_COLUMNS {
            if let Some(value) = (column.read)(record) {
                columns.push(column.name);
                values.push(value);
            }
        }

        Self {
            table: table.into(),
            columns,
            values,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn values(&self) -> &[ColumnValue] {
        &self.values
    }

    /// Positional placeholders, one per column: `$1, $2, ...`.
    pub fn placeholders(&self) -> Vec<String> {
        (1..=self.columns.len()).map(|i| format!("${}", i)).collect()
    }

    /// Statement text. Only catalog column names are interpolated; values are
    /// always bound.
    pub fn sql(&self) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(", "),
            self.placeholders().join(", ")
        )
    }

    /// Value bound to the given column, if the row references it.
    pub fn value_of(&self, column: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .position(|c| *c == column)
            .map(|i| &self.values[i])
    }
}

/// Executes one insert in its own transaction against the warehouse.
///
/// Implementations acquire a connection for the call and release it before
/// returning, on success and on failure.
#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn execute_insert(&self, statement: &InsertStatement) -> Result<(), AppError>;
}

/// Turns validated records into warehouse rows.
#[derive(Clone)]
pub struct LoanWriter {
    warehouse: Arc<dyn Warehouse>,
    table: String,
}

impl LoanWriter {
    pub fn new(warehouse: Arc<dyn Warehouse>, table: impl Into<String>) -> Self {
        Self {
            warehouse,
            table: table.into(),
        }
    }

    /// Assigns an identifier and timestamp, writes the row, returns the identifier.
    ///
    /// Failures are not retried; the caller must resubmit.
    pub async fn submit(&self, record: &LoanRecord) -> Result<Uuid, AppError> {
        let loan_id = Uuid::new_v4();
        let submitted_at = Utc::now();
        let statement = InsertStatement::for_record(&self.table, loan_id, submitted_at, record);

        tracing::debug!(
            loan_id = %loan_id,
            columns = statement.columns().len(),
            "Inserting loan application"
        );

        self.warehouse.execute_insert(&statement).await?;

        tracing::info!(loan_id = %loan_id, "Loan application stored");
        Ok(loan_id)
    }
}
