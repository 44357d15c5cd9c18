//! Column catalog for the loan table.
//!
//! One ordered list drives both halves of a submission: the validator checks
//! each entry's presence and JSON type, and the writer walks the same entries
//! to decide which columns a given row references. Adding an optional input
//! means adding a field to [`LoanRecord`] and one entry here.

use crate::models::LoanRecord;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

/// Column holding the generated submission identifier.
pub const ID_COLUMN: &str = "ID";
/// Column holding the server-side submission timestamp.
pub const SUBMITTED_AT_COLUMN: &str = "SUBMITTED_AT";

/// Declared primitive type of a payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Float,
    /// Integer rating; fractional JSON numbers are rejected.
    Ordinal,
    Flag,
}

impl ColumnKind {
    /// Whether a non-null JSON value has this kind. No coercion between kinds.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ColumnKind::Text => value.is_string(),
            ColumnKind::Float => value.is_number(),
            ColumnKind::Ordinal => value.is_i64(),
            ColumnKind::Flag => value.is_boolean(),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            ColumnKind::Text => "string",
            ColumnKind::Float => "number",
            ColumnKind::Ordinal => "integer",
            ColumnKind::Flag => "boolean",
        }
    }
}

/// A value bound to one positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(String),
    Float(f64),
    Ordinal(i64),
    Flag(bool),
    Timestamp(DateTime<Utc>),
}

/// One catalog entry: wire name (also the column name), type, whether the
/// payload must carry it, and how to read it off a validated record.
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub required: bool,
    pub read: fn(&LoanRecord) -> Option<ColumnValue>,
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .finish()
    }
}

fn text(value: &str) -> Option<ColumnValue> {
    Some(ColumnValue::Text(value.to_string()))
}

fn float(value: f64) -> Option<ColumnValue> {
    Some(ColumnValue::Float(value))
}

fn opt_text(value: &Option<String>) -> Option<ColumnValue> {
    value.as_deref().and_then(text)
}

fn opt_float(value: Option<f64>) -> Option<ColumnValue> {
    value.map(ColumnValue::Float)
}

fn opt_ordinal(value: Option<i64>) -> Option<ColumnValue> {
    value.map(ColumnValue::Ordinal)
}

const fn required(
    name: &'static str,
    kind: ColumnKind,
    read: fn(&LoanRecord) -> Option<ColumnValue>,
) -> Column {
    Column {
        name,
        kind,
        required: true,
        read,
    }
}

const fn optional(
    name: &'static str,
    kind: ColumnKind,
    read: fn(&LoanRecord) -> Option<ColumnValue>,
) -> Column {
    Column {
        name,
        kind,
        required: false,
        read,
    }
}

use ColumnKind::{Flag, Float, Ordinal, Text};

/// Every attribute a loan row may carry, in column order.
pub static LOAN_COLUMNS: &[Column] = &[
    required("lineOfBusiness", Text, |r| text(&r.line_of_business)),
    required("propertyType", Text, |r| text(&r.property_type)),
    required("loanType", Text, |r| text(&r.loan_type)),
    required("dscr", Float, |r| float(r.dscr)),
    required("occupancy", Float, |r| float(r.occupancy)),
    required("ltv", Float, |r| float(r.ltv)),
    optional("borrowerName", Text, |r| opt_text(&r.borrower_name)),
    optional("loanNumber", Text, |r| opt_text(&r.loan_number)),
    // Qualitative ratings
    optional("LeaseExpiration", Ordinal, |r| {
        opt_ordinal(r.qualitative.lease_expiration)
    }),
    optional("TenantRating", Ordinal, |r| {
        opt_ordinal(r.qualitative.tenant_rating)
    }),
    optional("AccessToCapitalMarkets", Ordinal, |r| {
        opt_ordinal(r.qualitative.access_to_capital_markets)
    }),
    optional("Liquidity", Ordinal, |r| opt_ordinal(r.qualitative.liquidity)),
    optional("MarketRent", Ordinal, |r| {
        opt_ordinal(r.qualitative.market_rent)
    }),
    optional("GuarantorNetWorth", Ordinal, |r| {
        opt_ordinal(r.qualitative.guarantor_net_worth)
    }),
    optional("NumberOfUnits", Ordinal, |r| {
        opt_ordinal(r.qualitative.number_of_units)
    }),
    optional("EconomicOutlook", Ordinal, |r| {
        opt_ordinal(r.qualitative.economic_outlook)
    }),
    optional("CollateralValue", Ordinal, |r| {
        opt_ordinal(r.qualitative.collateral_value)
    }),
    // Qualitative metric values
    optional("LeaseExpiration_Value", Float, |r| {
        opt_float(r.qualitative.lease_expiration_value)
    }),
    optional("TenantRating_Value", Float, |r| {
        opt_float(r.qualitative.tenant_rating_value)
    }),
    optional("AccessToCapitalMarkets_Value", Float, |r| {
        opt_float(r.qualitative.access_to_capital_markets_value)
    }),
    optional("Liquidity_Value", Float, |r| {
        opt_float(r.qualitative.liquidity_value)
    }),
    optional("MarketRent_Value", Float, |r| {
        opt_float(r.qualitative.market_rent_value)
    }),
    optional("GuarantorNetWorth_Value", Float, |r| {
        opt_float(r.qualitative.guarantor_net_worth_value)
    }),
    optional("NumberOfUnits_Value", Float, |r| {
        opt_float(r.qualitative.number_of_units_value)
    }),
    optional("EconomicOutlook_Value", Float, |r| {
        opt_float(r.qualitative.economic_outlook_value)
    }),
    optional("CollateralValue_Value", Float, |r| {
        opt_float(r.qualitative.collateral_value_value)
    }),
    // BRG
    required("quantitative_brg", Float, |r| float(r.brg.quantitative_brg)),
    required("adjustment_score_brg", Float, |r| {
        float(r.brg.adjustment_score_brg)
    }),
    required("q_adjusted_brg", Float, |r| float(r.brg.q_adjusted_brg)),
    required("weighted_brg", Float, |r| float(r.brg.weighted_brg)),
    required("final_brg", Float, |r| float(r.brg.final_brg)),
    // FRG
    required("quantitative_frg", Float, |r| float(r.frg.quantitative_frg)),
    required("adjustment_score_frg", Float, |r| {
        float(r.frg.adjustment_score_frg)
    }),
    required("q_adjusted_frg", Float, |r| float(r.frg.q_adjusted_frg)),
    required("final_frg", Float, |r| float(r.frg.final_frg)),
    // Override
    required("overrideEnabled", Flag, |r| {
        Some(ColumnValue::Flag(r.manual_override.override_enabled))
    }),
    optional("override_brg", Float, |r| {
        opt_float(r.manual_override.override_brg)
    }),
    optional("override_frg", Float, |r| {
        opt_float(r.manual_override.override_frg)
    }),
    optional("justification", Text, |r| {
        opt_text(&r.manual_override.justification)
    }),
];

/// Names of the columns every row references, generated ones first.
pub fn always_present_columns() -> Vec<&'static str> {
    [ID_COLUMN, SUBMITTED_AT_COLUMN]
        .into_iter()
        .chain(LOAN_COLUMNS.iter().filter(|c| c.required).map(|c| c.name))
        .collect()
}

/// Checks that every catalog name is a plain SQL identifier and unique.
///
/// Column names are the only text interpolated into the insert statement, so
/// the server refuses to start if this fails.
pub fn verify_catalog() -> anyhow::Result<()> {
    let identifier = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")?;
    let mut seen = HashSet::new();

    let names = [ID_COLUMN, SUBMITTED_AT_COLUMN]
        .into_iter()
        .chain(LOAN_COLUMNS.iter().map(|c| c.name));

    for name in names {
        if !identifier.is_match(name) {
            anyhow::bail!("column name {:?} is not a plain identifier", name);
        }
        if !seen.insert(name.to_ascii_uppercase()) {
            anyhow::bail!("column name {:?} is declared twice", name);
        }
    }

    tracing::debug!("Column catalog verified: {} columns", seen.len());
    Ok(())
}
