use crate::errors::{AppError, FieldViolation, ValidationError};
use crate::models::LoanRecord;
use crate::schema::LOAN_COLUMNS;
use serde_json::Value;

/// Checks an untyped payload against the column catalog and builds the
/// typed record.
///
/// Every violation is collected before returning, so the client sees all
/// offending fields at once. Explicit `null` counts as absent. Keys outside
/// the catalog are ignored and never reach the warehouse.
///
/// A payload that passes the catalog but still fails to decode means the
/// catalog and `LoanRecord` disagree; that is reported as `Internal`.
pub fn validate_loan_payload(payload: &Value) -> Result<LoanRecord, AppError> {
    let fields = payload
        .as_object()
        .ok_or_else(|| ValidationError::single("$", "payload must be a JSON object"))?;

    let mut violations = Vec::new();
    for column in LOAN_COLUMNS {
        match fields.get(column.name) {
            None | Some(Value::Null) => {
                if column.required {
                    violations.push(FieldViolation {
                        field: column.name.to_string(),
                        problem: "missing required field".to_string(),
                    });
                }
            }
            Some(value) if !column.kind.accepts(value) => {
                violations.push(FieldViolation {
                    field: column.name.to_string(),
                    problem: format!(
                        "expected {}, got {}",
                        column.kind.describe(),
                        json_type(value)
                    ),
                });
            }
            Some(_) => {}
        }
    }

    if !violations.is_empty() {
        return Err(ValidationError { violations }.into());
    }

    serde_json::from_value(payload.clone()).map_err(|e| {
        AppError::Internal(format!("loan record does not match the column catalog: {}", e))
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "fractional number",
        Value::Number(n) if !n.is_i64() => "out-of-range integer",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
