//! Payment provider adapters.
//!
//! A thin HTTP implementation of the `PaymentVerifier` port.

mod dto;
mod http_verifier;

pub use http_verifier::HttpPaymentVerifier;
