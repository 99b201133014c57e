use super::catalog::Product;
use crate::error::CheckoutError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: u32,
    pub title: String,
    pub vendor: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image: String,
}

impl CartLineItem {
    pub fn line_total(&self) -> Result<Decimal, CheckoutError> {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(out_of_range)
    }
}

fn out_of_range() -> CheckoutError {
    CheckoutError::ValidationError("Amount out of range".to_string())
}

/// The items a customer picked, in the order they were first added.
///
/// A quantity of zero is never stored: setting it removes the line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `product`, merging with an existing line.
    pub fn add_item(&mut self, product: &Product) {
        self.add_units(product, 1);
    }

    /// Adds `quantity` units of `product` at once. Zero is a no-op.
    pub fn add_units(&mut self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|l| l.id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }

        self.items.push(CartLineItem {
            id: product.id,
            title: product.title.clone(),
            vendor: product.vendor.clone(),
            unit_price: product.price,
            quantity,
            image: product.image.clone(),
        });
    }

    /// Removes the line for `id`. Returns whether a line was removed.
    pub fn remove_item(&mut self, id: u32) -> bool {
        let before = self.items.len();
        self.items.retain(|l| l.id != id);
        self.items.len() != before
    }

    pub fn set_quantity(&mut self, id: u32, quantity: u32) -> Result<(), CheckoutError> {
        if quantity == 0 {
            if self.remove_item(id) {
                return Ok(());
            }
        } else if let Some(line) = self.items.iter_mut().find(|l| l.id == id) {
            line.quantity = quantity;
            return Ok(());
        }

        Err(CheckoutError::ValidationError(format!(
            "Item {id} is not in the cart"
        )))
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Sum of line totals in major units.
    pub fn total_amount(&self) -> Result<Decimal, CheckoutError> {
        self.items.iter().try_fold(Decimal::ZERO, |acc, line| {
            acc.checked_add(line.line_total()?).ok_or_else(out_of_range)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(id: u32, price: Decimal) -> Product {
        Product {
            id,
            title: format!("Product {id}"),
            vendor: "Vendor".to_string(),
            price,
            compare_price: None,
            image: String::new(),
            description: String::new(),
            category: String::new(),
        }
    }

    #[test]
    fn test_add_item_merges_lines() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, dec!(10)));
        cart.add_item(&product(2, dec!(2.5)));
        cart.add_item(&product(1, dec!(10)));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].id, 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_amount().unwrap(), dec!(22.5));
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, dec!(10)));
        cart.add_item(&product(2, dec!(1)));

        cart.set_quantity(1, 0).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].id, 2);

        cart.set_quantity(2, 4).unwrap();
        assert_eq!(cart.total_amount().unwrap(), dec!(4));
    }

    #[test]
    fn test_set_quantity_unknown_item() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.set_quantity(9, 1),
            Err(CheckoutError::ValidationError(_))
        ));
        assert!(matches!(
            cart.set_quantity(9, 0),
            Err(CheckoutError::ValidationError(_))
        ));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_item(&product(1, dec!(1)));
        assert!(!cart.remove_item(2));
        assert!(cart.remove_item(1));
        assert!(cart.is_empty());

        cart.add_item(&product(3, dec!(1)));
        cart.clear();
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_amount().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_add_units_accumulates() {
        let mut cart = Cart::new();
        cart.add_units(&product(1, dec!(2)), 3);
        cart.add_units(&product(1, dec!(2)), 4);
        cart.add_units(&product(2, dec!(2)), 0);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total_items(), 7);
        assert_eq!(cart.total_amount().unwrap(), dec!(14));
    }

    #[test]
    fn test_total_out_of_range() {
        let mut cart = Cart::new();
        cart.add_units(&product(1, Decimal::MAX), 2);
        assert!(matches!(
            cart.total_amount(),
            Err(CheckoutError::ValidationError(msg)) if msg == "Amount out of range"
        ));

        let mut cart = Cart::new();
        cart.add_item(&product(1, Decimal::MAX));
        cart.add_item(&product(2, Decimal::MAX));
        assert!(cart.items()[0].line_total().is_ok());
        assert!(cart.total_amount().is_err());
    }
}
