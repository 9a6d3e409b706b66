//! Business logic services.
//!
//! Services sit between route handlers and the repositories. Simple reads go
//! straight to [`crate::db`]; anything with rules or a transaction lives here.

pub mod auth;
pub mod checkout;

pub use auth::{AuthError, AuthService, AuthSession, Registration};
pub use checkout::{CheckoutError, CheckoutPlan, CheckoutService};
