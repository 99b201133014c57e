//! Checkout domain: catalog data, the cart, and the payment attempt model.
//!
//! Nothing in here performs I/O. Gateways and notification targets are
//! reached through the traits in [`ports`].

pub mod cart;
pub mod catalog;
pub mod money;
pub mod payment;
pub mod ports;
