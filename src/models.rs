use serde::{Deserialize, Serialize};

// ============ Submission Models ============

/// A validated loan risk assessment as submitted by the scoring front end.
///
/// Required attributes are plain values. Every optional attribute is an
/// `Option` so that "not sent" stays distinct from zero, empty or false.
/// Keys follow the front end's wire names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    /// Line of business tag (e.g. "CRE").
    #[serde(rename = "lineOfBusiness")]
    pub line_of_business: String,
    /// Property type (e.g. "Office", "Multi-Family").
    #[serde(rename = "propertyType")]
    pub property_type: String,
    /// Loan type (e.g. "Bridge", "Permanent").
    #[serde(rename = "loanType")]
    pub loan_type: String,
    /// Debt service coverage ratio.
    pub dscr: f64,
    /// Occupancy ratio.
    pub occupancy: f64,
    /// Loan to value ratio.
    pub ltv: f64,

    /// Free-text borrower name.
    #[serde(rename = "borrowerName", default)]
    pub borrower_name: Option<String>,
    /// Free-text loan reference from the originating system.
    #[serde(rename = "loanNumber", default)]
    pub loan_number: Option<String>,

    #[serde(flatten)]
    pub qualitative: QualitativeInputs,

    #[serde(flatten)]
    pub brg: BorrowerRiskGrade,

    #[serde(flatten)]
    pub frg: FacilityRiskGrade,

    #[serde(flatten)]
    pub manual_override: GradeOverride,
}

/// Qualitative ratings (ordinal 1-6 on the form) and the metric behind each.
///
/// Which ones are sent depends on the property type, so all are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualitativeInputs {
    #[serde(rename = "LeaseExpiration", default)]
    pub lease_expiration: Option<i64>,
    #[serde(rename = "LeaseExpiration_Value", default)]
    pub lease_expiration_value: Option<f64>,

    #[serde(rename = "TenantRating", default)]
    pub tenant_rating: Option<i64>,
    #[serde(rename = "TenantRating_Value", default)]
    pub tenant_rating_value: Option<f64>,

    #[serde(rename = "AccessToCapitalMarkets", default)]
    pub access_to_capital_markets: Option<i64>,
    #[serde(rename = "AccessToCapitalMarkets_Value", default)]
    pub access_to_capital_markets_value: Option<f64>,

    #[serde(rename = "Liquidity", default)]
    pub liquidity: Option<i64>,
    #[serde(rename = "Liquidity_Value", default)]
    pub liquidity_value: Option<f64>,

    #[serde(rename = "MarketRent", default)]
    pub market_rent: Option<i64>,
    #[serde(rename = "MarketRent_Value", default)]
    pub market_rent_value: Option<f64>,

    #[serde(rename = "GuarantorNetWorth", default)]
    pub guarantor_net_worth: Option<i64>,
    #[serde(rename = "GuarantorNetWorth_Value", default)]
    pub guarantor_net_worth_value: Option<f64>,

    #[serde(rename = "NumberOfUnits", default)]
    pub number_of_units: Option<i64>,
    #[serde(rename = "NumberOfUnits_Value", default)]
    pub number_of_units_value: Option<f64>,

    #[serde(rename = "EconomicOutlook", default)]
    pub economic_outlook: Option<i64>,
    #[serde(rename = "EconomicOutlook_Value", default)]
    pub economic_outlook_value: Option<f64>,

    #[serde(rename = "CollateralValue", default)]
    pub collateral_value: Option<i64>,
    #[serde(rename = "CollateralValue_Value", default)]
    pub collateral_value_value: Option<f64>,
}

/// Borrower risk grade track, computed by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowerRiskGrade {
    pub quantitative_brg: f64,
    pub adjustment_score_brg: f64,
    pub q_adjusted_brg: f64,
    pub weighted_brg: f64,
    pub final_brg: f64,
}

/// Facility risk grade track, computed by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRiskGrade {
    pub quantitative_frg: f64,
    pub adjustment_score_frg: f64,
    pub q_adjusted_frg: f64,
    pub final_frg: f64,
}

/// Manual override of the computed grades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeOverride {
    #[serde(rename = "overrideEnabled")]
    pub override_enabled: bool,
    #[serde(default)]
    pub override_brg: Option<f64>,
    #[serde(default)]
    pub override_frg: Option<f64>,
    #[serde(default)]
    pub justification: Option<String>,
}

// ============ API Response Models ============

/// Body returned by `POST /submit-loan` once the row is committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitLoanResponse {
    pub message: String,
    pub loan_id: String,
}

impl SubmitLoanResponse {
    pub fn submitted(loan_id: String) -> Self {
        Self {
            message: "Loan application submitted successfully".to_string(),
            loan_id,
        }
    }
}
