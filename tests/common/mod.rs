#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use storefront_checkout::application::session::CheckoutSession;
use storefront_checkout::config::StoreConfig;
use storefront_checkout::domain::ports::NotifierHandle;
use storefront_checkout::infrastructure::relay::RelayGateway;
use tempfile::NamedTempFile;

pub const FIXTURE: &str = "tests/fixtures/store.json";
pub const MASTERCARD: &str = "token_SF6A3zLrLs9LAU";

pub fn fixture_config() -> StoreConfig {
    StoreConfig::load(FIXTURE).expect("fixture config")
}

/// Writes the fixture config with its relay pointed at `base_url`.
pub fn config_file_for(base_url: &str) -> NamedTempFile {
    let raw = std::fs::read_to_string(Path::new(FIXTURE)).expect("fixture");
    let mut json: serde_json::Value = serde_json::from_str(&raw).expect("fixture json");
    json["relay"]["base_url"] = serde_json::Value::String(base_url.to_string());

    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "{json}").expect("write config");
    file
}

/// A session over the real relay client, with the fixture's fast polling.
pub async fn relay_session(base_url: &str, notifier: NotifierHandle) -> CheckoutSession {
    let mut config = fixture_config();
    config.relay.base_url = base_url.to_string();

    let gateway = RelayGateway::new(config.relay_config()).expect("relay client");
    let session = CheckoutSession::new(
        Arc::new(gateway),
        notifier,
        config.saved_instruments.clone(),
        config.checkout_settings(),
    );

    let lipstick = config.catalog.get(1).expect("product 1");
    session.add_item(lipstick).await;
    session.add_item(lipstick).await;
    session.select_instrument(MASTERCARD).await.expect("card");
    session
}
