//! Application layer: the checkout session and the payment state machine.
//!
//! `CheckoutSession` is the entry point views talk to. Network work for a
//! submitted attempt runs in a single background task (`driver`), so at most
//! one gateway call is outstanding per attempt and cancelling the session
//! deterministically stops it.

mod driver;
pub mod session;

pub use driver::PollPolicy;
