//! Spanish step vocabulary shared by both journeys
//!
//! Journey data (credentials, default product, expected checkout error)
//! comes from configuration. Every step appends a report entry.

pub mod login;
pub mod catalog;
pub mod cart;
pub mod checkout;
pub mod messages;

/// Button labels used in feature files
pub mod buttons {
    pub const ADD_TO_CART: &str = "ADD TO CART";
    pub const REMOVE: &str = "REMOVE";
    pub const CHECKOUT: &str = "CHECKOUT";
    pub const CONTINUE: &str = "CONTINUE";
}
