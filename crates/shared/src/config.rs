//! Application configuration management.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::{Currency, EntityId};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// ERP (Odoo) connection configuration.
    pub erp: ErpConfig,
    /// Thresholds and windows for the analytics engines.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    /// Legal entities of the group.
    #[serde(default = "default_entities")]
    pub entities: Vec<EntityConfig>,
    /// Intercompany relationships between entities.
    #[serde(default = "default_relationships")]
    pub relationships: Vec<RelationshipConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// ERP connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ErpConfig {
    /// JSON-RPC endpoint (e.g. `https://example.odoo.com/jsonrpc`).
    pub url: String,
    /// Database name.
    pub database: String,
    /// Numeric user id the API key belongs to.
    pub uid: u32,
    /// API key.
    pub api_key: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after a transport failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Intercompany current-account codes mapped to the counterparty entity.
    #[serde(default = "default_intercompany_accounts")]
    pub intercompany_accounts: HashMap<String, u32>,
    /// Account code prefixes carrying output (sales) VAT.
    #[serde(default = "default_vat_output_prefixes")]
    pub vat_output_prefixes: Vec<String>,
    /// Account code prefixes carrying input (purchase) VAT.
    #[serde(default = "default_vat_input_prefixes")]
    pub vat_input_prefixes: Vec<String>,
    /// Account code prefixes of income accounts.
    #[serde(default = "default_revenue_prefixes")]
    pub revenue_prefixes: Vec<String>,
    /// Account code prefixes of expense and cost-of-sales accounts.
    #[serde(default = "default_cost_prefixes")]
    pub cost_prefixes: Vec<String>,
    /// Currency the companies keep their books in.
    #[serde(default)]
    pub company_currency: Currency,
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8069/jsonrpc".to_string(),
            database: String::new(),
            uid: 2,
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            intercompany_accounts: default_intercompany_accounts(),
            vat_output_prefixes: default_vat_output_prefixes(),
            vat_input_prefixes: default_vat_input_prefixes(),
            revenue_prefixes: default_revenue_prefixes(),
            cost_prefixes: default_cost_prefixes(),
            company_currency: Currency::default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    2
}

fn default_intercompany_accounts() -> HashMap<String, u32> {
    HashMap::from([
        ("126100".to_string(), 3),
        ("126200".to_string(), 2),
        ("126300".to_string(), 1),
        ("126400".to_string(), 1),
    ])
}

fn default_vat_output_prefixes() -> Vec<String> {
    vec!["150".to_string()]
}

fn default_vat_input_prefixes() -> Vec<String> {
    vec!["151".to_string(), "152".to_string()]
}

fn default_revenue_prefixes() -> Vec<String> {
    vec!["8".to_string()]
}

fn default_cost_prefixes() -> Vec<String> {
    vec!["4".to_string(), "7".to_string()]
}

/// How often VAT returns are filed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VatCadence {
    /// One return per calendar month.
    Monthly,
    /// One return per calendar quarter.
    #[default]
    Quarterly,
    /// One return per calendar year.
    Yearly,
}

/// Thresholds and windows for the analytics engines.
///
/// Passed explicitly into every engine call; nothing reads it from global state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Currency every engine input must be expressed in.
    pub reporting_currency: Currency,
    /// Absolute intercompany break threshold.
    pub tolerance_amount: Decimal,
    /// Net VAT payable above which R1 triggers.
    pub vat_payable_threshold: Decimal,
    /// Minimum swing for a sign reversal to trigger R2.
    pub vat_delta_threshold: Decimal,
    /// Decimal places VAT aggregates are rounded to.
    pub vat_rounding_dp: u32,
    /// VAT filing cadence.
    pub vat_cadence: VatCadence,
    /// Number of weekly cashflow buckets.
    pub forecast_horizon_weeks: u32,
    /// Fixed report date; today when absent.
    pub as_of_date: Option<NaiveDate>,
    /// Conversion rates into the reporting currency, keyed by ISO code.
    pub fx_rates: HashMap<String, Decimal>,
    /// Lifetime of cached ledger snapshots in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            reporting_currency: Currency::Eur,
            tolerance_amount: Decimal::ONE,
            vat_payable_threshold: Decimal::from(40_000),
            vat_delta_threshold: Decimal::from(10_000),
            vat_rounding_dp: 2,
            vat_cadence: VatCadence::Quarterly,
            forecast_horizon_weeks: 12,
            as_of_date: None,
            fx_rates: HashMap::new(),
            cache_ttl_secs: 300,
        }
    }
}

impl AnalyticsConfig {
    /// Resolves the report date, falling back to `today`.
    #[must_use]
    pub fn resolve_as_of(&self, today: NaiveDate) -> NaiveDate {
        self.as_of_date.unwrap_or(today)
    }

    /// Returns the rate converting `currency` into the reporting currency.
    ///
    /// The reporting currency always converts at one.
    #[must_use]
    pub fn fx_rate(&self, currency: Currency) -> Option<Decimal> {
        if currency == self.reporting_currency {
            return Some(Decimal::ONE);
        }
        self.fx_rates
            .iter()
            .find(|(code, _)| Currency::from_str(code).is_ok_and(|c| c == currency))
            .map(|(_, rate)| *rate)
    }

    /// Validates ranges and rate tables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` describing the first invalid option.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.tolerance_amount.is_sign_negative() {
            return Err(AppError::Configuration(
                "tolerance_amount must not be negative".into(),
            ));
        }
        if self.vat_payable_threshold.is_sign_negative()
            || self.vat_delta_threshold.is_sign_negative()
        {
            return Err(AppError::Configuration(
                "VAT thresholds must not be negative".into(),
            ));
        }
        if !(1..=52).contains(&self.forecast_horizon_weeks) {
            return Err(AppError::Configuration(
                "forecast_horizon_weeks must be between 1 and 52".into(),
            ));
        }
        if self.vat_rounding_dp > 6 {
            return Err(AppError::Configuration(
                "vat_rounding_dp must be at most 6".into(),
            ));
        }
        for (code, rate) in &self.fx_rates {
            Currency::from_str(code).map_err(AppError::Configuration)?;
            if *rate <= Decimal::ZERO {
                return Err(AppError::Configuration(format!(
                    "fx rate for {code} must be positive"
                )));
            }
        }
        Ok(())
    }
}

/// Role of an entity inside the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityRole {
    /// Holding entity.
    Parent,
    /// Owned by the parent.
    Subsidiary,
    /// Shares a parent with another entity.
    Sibling,
}

/// Static definition of a legal entity.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityConfig {
    /// ERP company id.
    pub id: u32,
    /// Registered name.
    pub legal_name: String,
    /// Short label for tables.
    pub short_name: String,
    /// VAT registration number including country prefix.
    pub vat_number: String,
    /// Role in the group.
    pub role: EntityRole,
}

/// An intercompany relationship between two entities.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RelationshipConfig {
    /// First entity.
    pub a: u32,
    /// Second entity.
    pub b: u32,
}

impl RelationshipConfig {
    /// Returns both ends as typed ids.
    #[must_use]
    pub const fn ends(self) -> (EntityId, EntityId) {
        (EntityId(self.a), EntityId(self.b))
    }
}

fn default_entities() -> Vec<EntityConfig> {
    vec![
        EntityConfig {
            id: 1,
            legal_name: "Pure & Original B.V.".to_string(),
            short_name: "P&O BV".to_string(),
            vat_number: "NL820994297B01".to_string(),
            role: EntityRole::Parent,
        },
        EntityConfig {
            id: 3,
            legal_name: "Pure & Original International B.V.".to_string(),
            short_name: "P&O Int".to_string(),
            vat_number: "NL862809095B01".to_string(),
            role: EntityRole::Subsidiary,
        },
        EntityConfig {
            id: 2,
            legal_name: "Mia Colore B.V.".to_string(),
            short_name: "Mia Colore".to_string(),
            vat_number: "NL820994327B01".to_string(),
            role: EntityRole::Sibling,
        },
    ]
}

fn default_relationships() -> Vec<RelationshipConfig> {
    vec![
        RelationshipConfig { a: 1, b: 3 },
        RelationshipConfig { a: 1, b: 2 },
        RelationshipConfig { a: 3, b: 2 },
    ]
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CONSOLIDATOR").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
