use crate::application::PollPolicy;
use crate::application::session::CheckoutSettings;
use crate::domain::catalog::{Catalog, InstrumentBook};
use crate::domain::payment::CustomerMeta;
use crate::error::{CheckoutError, Result};
use crate::infrastructure::relay::RelayConfig;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelaySection {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollingSection {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            interval_ms: 2_000,
            max_attempts: 60,
        }
    }
}

/// Store configuration: where the relay is, who the customer is, and the
/// catalog and saved instruments the storefront offers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub relay: RelaySection,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub customer: CustomerMeta,
    #[serde(default)]
    pub polling: PollingSection,
    pub catalog: Catalog,
    #[serde(default)]
    pub saved_instruments: InstrumentBook,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl StoreConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.currency.trim().is_empty() {
            return Err(CheckoutError::ConfigError("currency must not be empty".into()));
        }
        if self.polling.max_attempts == 0 {
            return Err(CheckoutError::ConfigError(
                "polling.max_attempts must be at least 1".into(),
            ));
        }
        if self.relay.base_url.trim().is_empty() {
            return Err(CheckoutError::ConfigError("relay.base_url must not be empty".into()));
        }

        let mut product_ids = HashSet::new();
        for product in self.catalog.products() {
            if !product_ids.insert(product.id) {
                return Err(CheckoutError::ConfigError(format!(
                    "duplicate product id: {}",
                    product.id
                )));
            }
        }
        let mut instrument_ids = HashSet::new();
        for instrument in self.saved_instruments.items() {
            if !instrument_ids.insert(instrument.id.as_str()) {
                return Err(CheckoutError::ConfigError(format!(
                    "duplicate saved instrument id: {}",
                    instrument.id
                )));
            }
        }
        Ok(())
    }

    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            base_url: self.relay.base_url.clone(),
            timeout: Duration::from_secs(self.relay.timeout_secs),
        }
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            currency: self.currency.clone(),
            customer: self.customer.clone(),
            polling: PollPolicy {
                interval: Duration::from_millis(self.polling.interval_ms),
                max_attempts: self.polling.max_attempts,
            },
        }
    }
}
