//! Plain-text views for the storefront.
//!
//! Views are pure functions of the data they are handed. The payment view
//! only reads the attempt's state, message and display fields.

use crate::domain::cart::Cart;
use crate::domain::catalog::{Catalog, InstrumentBook};
use crate::domain::payment::{PaymentAttempt, PaymentState};
use crate::error::CheckoutError;
use rust_decimal::Decimal;
use std::fmt::Write;

pub fn render_catalog(catalog: &Catalog, currency: &str) -> String {
    let mut out = String::from("Products\n");
    for product in catalog.products() {
        let _ = write!(
            out,
            "  [{}] {} ({}) {currency} {}",
            product.id, product.title, product.vendor, product.price
        );
        if let Some(compare) = product.compare_price {
            let discount = product.discount_percent();
            if discount > 0 {
                let _ = write!(out, " (was {compare}, {discount}% off)");
            }
        }
        out.push('\n');
    }
    out
}

pub fn render_instruments(instruments: &InstrumentBook, selected: Option<&str>) -> String {
    let mut out = String::from("Saved cards\n");
    if instruments.items().is_empty() {
        out.push_str("  (none)\n");
    }
    for instrument in instruments.items() {
        let marker = if selected == Some(instrument.id.as_str()) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(out, " {marker}{} {}", instrument.id, instrument.label());
    }
    out
}

pub fn render_cart(cart: &Cart, currency: &str) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::from("Cart\n");
    for line in cart.items() {
        let _ = writeln!(
            out,
            "  {} x{} @ {currency} {} = {}",
            line.title,
            line.quantity,
            line.unit_price,
            amount_text(line.line_total(), currency)
        );
    }
    let _ = writeln!(
        out,
        "  {} item(s), total {}",
        cart.total_items(),
        amount_text(cart.total_amount(), currency)
    );
    out
}

fn amount_text(amount: Result<Decimal, CheckoutError>, currency: &str) -> String {
    match amount {
        Ok(amount) => format!("{currency} {amount}"),
        Err(_) => "amount out of range".to_string(),
    }
}

/// One status line for the payment view.
pub fn render_payment(attempt: &PaymentAttempt) -> String {
    match attempt.state() {
        PaymentState::Idle => "Select a card and pay".to_string(),
        PaymentState::Submitting => match attempt.amount() {
            Some(amount) => format!("Processing payment of {amount}..."),
            None => "Processing payment...".to_string(),
        },
        PaymentState::AwaitingAuthentication => match attempt.authentication_url() {
            Some(url) => format!("Authentication required, open: {url}"),
            None => "Authentication required".to_string(),
        },
        PaymentState::Polling => format!(
            "Waiting for payment confirmation (check {})",
            attempt.poll_attempts() + 1
        ),
        PaymentState::Succeeded | PaymentState::Failed | PaymentState::TimedOut => attempt
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| attempt.state().to_string()),
    }
}
