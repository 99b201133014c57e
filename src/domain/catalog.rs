use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A product offered by the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub title: String,
    pub vendor: String,
    /// Selling price in major units.
    pub price: Decimal,
    /// Pre-discount price shown struck through, if any.
    #[serde(default, rename = "comparePrice", alias = "compare_price")]
    pub compare_price: Option<Decimal>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

impl Product {
    /// Percentage saved against `compare_price`, rounded to a whole number.
    pub fn discount_percent(&self) -> u32 {
        match self.compare_price {
            Some(compare) if compare > Decimal::ZERO && compare > self.price => {
                let pct = (compare - self.price) / compare * Decimal::ONE_HUNDRED;
                pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_u32()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }
}

/// The products the storefront is configured with, in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub last4: String,
    pub network: String,
    #[serde(rename = "type", default)]
    pub card_type: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub expiry_month: Option<String>,
    #[serde(default)]
    pub expiry_year: Option<String>,
}

/// A payment method the customer saved with the gateway.
///
/// `id` is what the customer selects; `token` is what gets charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedInstrument {
    pub id: String,
    pub token: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub card: Option<CardDetails>,
    #[serde(default)]
    pub status: Option<String>,
}

fn default_method() -> String {
    "card".to_string()
}

impl SavedInstrument {
    pub fn label(&self) -> String {
        match &self.card {
            Some(card) => format!(
                "{} {} •••• {}",
                card.network, card.card_type, card.last4
            ),
            None => format!("{} {}", self.method, self.id),
        }
    }
}

/// The customer's saved instruments, in the gateway's collection shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentBook {
    #[serde(default)]
    items: Vec<SavedInstrument>,
}

impl InstrumentBook {
    pub fn new(items: Vec<SavedInstrument>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[SavedInstrument] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&SavedInstrument> {
        self.items.iter().find(|i| i.id == id)
    }
}
