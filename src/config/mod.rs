use anyhow::Result;
use dotenvy::dotenv;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::calculator::{default_tax_rate, TaxPolicy, DEFAULT_CURRENCY_SYMBOL};

const ENV_PREFIX: &str = "PROFORMA_";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("tax rate {0} must be between 0 and 1")]
    TaxRateOutOfRange(Decimal),
}

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Fraction applied as IVA, e.g. 0.12
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    /// Prefix printed before every amount
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    /// Where the encoded form body goes; stdout when unset
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("proforma.log")
}

impl Config {
    /// Load configuration from `PROFORMA_*` environment variables
    ///
    /// A `.env` file is read first if it exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::prefixed(ENV_PREFIX).from_env::<Config>()?;
        config.validate()?;

        Ok(config)
    }

    /// Same as `load`, but from explicit key/value pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(pairs)?;
        config.validate()?;

        Ok(config)
    }

    /// Apply command line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        tax_rate: Option<Decimal>,
        currency_symbol: Option<String>,
        output_path: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(rate) = tax_rate {
            self.tax_rate = rate;
        }
        if let Some(symbol) = currency_symbol {
            self.currency_symbol = symbol;
        }
        if output_path.is_some() {
            self.output_path = output_path;
        }
        self.validate()?;

        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(ConfigError::TaxRateOutOfRange(self.tax_rate));
        }
        Ok(())
    }

    pub fn tax_policy(&self) -> TaxPolicy {
        TaxPolicy::new(self.tax_rate, &self.currency_symbol)
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_pairs(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(config.tax_rate, dec!(0.12));
        assert_eq!(config.currency_symbol, "$");
        assert!(config.output_path().is_none());
        assert_eq!(config.log_file, PathBuf::from("proforma.log"));
    }

    #[test]
    fn reads_prefixed_variables() {
        let config = Config::from_pairs(pairs(&[
            ("PROFORMA_TAX_RATE", "0.15"),
            ("PROFORMA_CURRENCY_SYMBOL", "S/"),
            ("PROFORMA_OUTPUT_PATH", "/tmp/proforma.form"),
            ("DATABASE_URL", "ignored"),
        ]))
        .unwrap();

        assert_eq!(config.tax_rate, dec!(0.15));
        assert_eq!(config.tax_policy(), TaxPolicy::new(dec!(0.15), "S/"));
        assert_eq!(config.output_path(), Some(Path::new("/tmp/proforma.form")));
    }

    #[test]
    fn rejects_rate_above_one() {
        let err = Config::from_pairs(pairs(&[("PROFORMA_TAX_RATE", "12")])).unwrap_err();
        assert!(err.to_string().contains("between 0 and 1"));
    }

    #[test]
    fn overrides_win_over_environment() {
        let config = Config::from_pairs(pairs(&[("PROFORMA_TAX_RATE", "0.15")]))
            .unwrap()
            .with_overrides(Some(dec!(0.08)), Some("€".to_string()), None)
            .unwrap();

        assert_eq!(config.tax_rate, dec!(0.08));
        assert_eq!(config.currency_symbol, "€");

        let invalid = Config::from_pairs(Vec::<(String, String)>::new())
            .unwrap()
            .with_overrides(Some(dec!(-0.1)), None, None);
        assert!(invalid.is_err());
    }
}
