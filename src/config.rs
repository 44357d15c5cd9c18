use serde::Deserialize;

/// Compute warehouse every connection is tagged with.
pub const WAREHOUSE_NAME: &str = "COMPUTE_WH";
/// Database holding the loan table.
pub const WAREHOUSE_DATABASE: &str = "DRR";
/// Schema holding the loan table.
pub const WAREHOUSE_SCHEMA: &str = "DRRSCHEMA";
/// Table receiving one row per submission.
pub const LOAN_TABLE: &str = "LoanApplications";

const DEFAULT_PORT: &str = "8000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_WAREHOUSE_PORT: u16 = 5432;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub warehouse_user: String,
    pub warehouse_password: String,
    pub warehouse_account: String,
    pub cors_allowed_origin: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            warehouse_user: std::env::var("WAREHOUSE_USER")
                .map_err(|_| anyhow::anyhow!("WAREHOUSE_USER environment variable required"))
                .and_then(|user| {
                    if user.trim().is_empty() {
                        anyhow::bail!("WAREHOUSE_USER cannot be empty");
                    }
                    Ok(user)
                })?,
            warehouse_password: std::env::var("WAREHOUSE_PASSWORD")
                .map_err(|_| anyhow::anyhow!("WAREHOUSE_PASSWORD environment variable required"))
                .and_then(|pass| {
                    if pass.is_empty() {
                        anyhow::bail!("WAREHOUSE_PASSWORD cannot be empty");
                    }
                    Ok(pass)
                })?,
            warehouse_account: std::env::var("WAREHOUSE_ACCOUNT")
                .map_err(|_| anyhow::anyhow!("WAREHOUSE_ACCOUNT environment variable required"))
                .and_then(|account| {
                    if account.trim().is_empty() {
                        anyhow::bail!("WAREHOUSE_ACCOUNT cannot be empty");
                    }
                    Ok(account.trim().to_string())
                })?,
            cors_allowed_origin: std::env::var("CORS_ALLOWED_ORIGIN")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map_or_else(|| normalize_origin(DEFAULT_CORS_ORIGIN), |o| normalize_origin(&o))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Warehouse account: {}", config.warehouse_account);
        tracing::debug!("CORS origin: {}", config.cors_allowed_origin);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Splits `WAREHOUSE_ACCOUNT` into host and port; the port defaults when omitted.
    pub fn warehouse_endpoint(&self) -> anyhow::Result<(String, u16)> {
        split_account(&self.warehouse_account)
    }

    /// `schema.table` name used in statements. The database is selected by
    /// the connection, so it must not appear in the SQL text.
    pub fn loan_table(&self) -> String {
        format!("{}.{}", WAREHOUSE_SCHEMA, LOAN_TABLE)
    }

    /// `database.schema.table` name, for logs only.
    pub fn qualified_loan_table(&self) -> String {
        format!("{}.{}", WAREHOUSE_DATABASE, self.loan_table())
    }
}

fn normalize_origin(origin: &str) -> anyhow::Result<String> {
    let origin = origin.trim().trim_end_matches('/');
    if !origin.starts_with("http://") && !origin.starts_with("https://") {
        anyhow::bail!("CORS_ALLOWED_ORIGIN must start with http:// or https://");
    }
    Ok(origin.to_string())
}

fn split_account(account: &str) -> anyhow::Result<(String, u16)> {
    match account.rsplit_once(':') {
        Some((host, port)) => {
            if host.is_empty() {
                anyhow::bail!("WAREHOUSE_ACCOUNT is missing a host before ':'");
            }
            let port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("WAREHOUSE_ACCOUNT port must be a valid number"))?;
            Ok((host.to_string(), port))
        }
        None => Ok((account.to_string(), DEFAULT_WAREHOUSE_PORT)),
    }
}
