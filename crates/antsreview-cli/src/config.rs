//! CLI Configuration
//!
//! Layered as: `config/default`, `config/local`, the explicit config file,
//! then `ANTSREVIEW__`-prefixed environment variables. Later layers win.
//! Every field has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use antsreview_types::Amount;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Display settings for the review token
    #[serde(default)]
    pub token: TokenSettings,

    #[serde(default)]
    pub protocol: ProtocolSettings,

    /// Parties and amounts used by `antsreview demo`
    #[serde(default)]
    pub demo: DemoSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSettings {
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Decimal places between the smallest unit and one whole token
    #[serde(default)]
    pub decimals: u32,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimals: 0,
        }
    }
}

impl TokenSettings {
    /// Render an amount in whole tokens, e.g. `1.50 ANTS`
    pub fn format(&self, amount: Amount) -> String {
        let Some(scale) = 10u64.checked_pow(self.decimals) else {
            return format!("{} {} (base units)", amount, self.symbol);
        };
        if self.decimals == 0 {
            return format!("{} {}", amount, self.symbol);
        }
        format!(
            "{}.{:0width$} {}",
            amount.0 / scale,
            amount.0 % scale,
            self.symbol,
            width = self.decimals as usize
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolSettings {
    /// Deploying address; becomes the first admin
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Custody account escrowed funds are held in
    #[serde(default = "default_custody_account")]
    pub custody_account: String,

    /// Deadline offset for newly issued tasks
    #[serde(default = "default_review_period_days")]
    pub default_review_period_days: i64,

    /// Broadcast capacity of the event log
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            custody_account: default_custody_account(),
            default_review_period_days: default_review_period_days(),
            event_buffer: default_event_buffer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoSettings {
    #[serde(default = "default_issuer")]
    pub issuer: String,

    #[serde(default = "default_approver")]
    pub approver: String,

    #[serde(default = "default_anter")]
    pub anter: String,

    #[serde(default = "default_peer_reviewer")]
    pub peer_reviewer: String,

    /// Genesis balance handed to the anter
    #[serde(default = "default_anter_allocation")]
    pub anter_allocation: u64,

    #[serde(default = "default_contribution")]
    pub contribution: u64,

    /// Amount the approver releases to the peer reviewer
    #[serde(default = "default_payout")]
    pub payout: u64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            approver: default_approver(),
            anter: default_anter(),
            peer_reviewer: default_peer_reviewer(),
            anter_allocation: default_anter_allocation(),
            contribution: default_contribution(),
            payout: default_payout(),
        }
    }
}

// =============================================================================
// Default Functions
// =============================================================================

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_symbol() -> String {
    "ANTS".to_string()
}

fn default_owner() -> String {
    "0xowner".to_string()
}

fn default_custody_account() -> String {
    antsreview_ledger::DEFAULT_CUSTODY_ACCOUNT.to_string()
}

fn default_review_period_days() -> i64 {
    7
}

fn default_event_buffer() -> usize {
    antsreview_events::DEFAULT_EVENT_BUFFER
}

fn default_issuer() -> String {
    "0xissuer".to_string()
}

fn default_approver() -> String {
    "0xapprover".to_string()
}

fn default_anter() -> String {
    "0xanter".to_string()
}

fn default_peer_reviewer() -> String {
    "0xreviewer".to_string()
}

fn default_anter_allocation() -> u64 {
    1_000
}

fn default_contribution() -> u64 {
    100
}

fn default_payout() -> u64 {
    60
}

// =============================================================================
// Configuration Loading
// =============================================================================

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        Self::load_from(Path::new("config"), config_path)
    }

    /// Layer `default`/`local` from `config_dir`, then the explicit file, then env
    pub fn load_from(config_dir: &Path, config_path: Option<&str>) -> anyhow::Result<Self> {
        let base = |name: &str| config_dir.join(name).to_string_lossy().into_owned();

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(&base("default")).required(false))
            .add_source(config::File::with_name(&base("local")).required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ANTSREVIEW")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Reject settings the walkthrough cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.protocol.default_review_period_days <= 0 {
            anyhow::bail!("protocol.default_review_period_days must be positive");
        }
        let demo = &self.demo;
        if demo.payout == 0 || demo.contribution == 0 {
            anyhow::bail!("demo.contribution and demo.payout must be positive");
        }
        if demo.payout > demo.contribution {
            anyhow::bail!(
                "demo.payout ({}) exceeds demo.contribution ({})",
                demo.payout,
                demo.contribution
            );
        }
        if demo.contribution > demo.anter_allocation {
            anyhow::bail!(
                "demo.contribution ({}) exceeds demo.anter_allocation ({})",
                demo.contribution,
                demo.anter_allocation
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(source: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.token.symbol, "ANTS");
        assert_eq!(config.protocol.default_review_period_days, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = from_toml(
            r#"
            [logging]
            format = "json"

            [demo]
            payout = 25
            "#,
        );

        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.demo.payout, 25);
        assert_eq!(config.demo.contribution, 100);
        assert_eq!(config.protocol.owner, "0xowner");
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config");
        let path = std::env::temp_dir().join(format!(
            "antsreview-explicit-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[demo]\npayout = 25\n").unwrap();

        let loaded = AppConfig::load_from(&shipped, path.to_str());
        std::fs::remove_file(&path).unwrap();
        let config = loaded.unwrap();

        assert_eq!(config.demo.payout, 25);
        assert_eq!(config.demo.contribution, 100);
        assert_eq!(config.protocol.custody_account, "antsreview-escrow");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config");

        assert!(AppConfig::load_from(&shipped, Some("/nonexistent/antsreview.toml")).is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_payout() {
        let mut config = AppConfig::default();
        config.demo.payout = config.demo.contribution + 1;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_format() {
        let mut token = TokenSettings::default();
        assert_eq!(token.format(Amount::new(100)), "100 ANTS");

        token.decimals = 2;
        assert_eq!(token.format(Amount::new(150)), "1.50 ANTS");
        assert_eq!(token.format(Amount::new(7)), "0.07 ANTS");
    }
}
