//! # Storage Module
//!
//! Handles persistence of the transaction history.
//!
//! The domain layer works against the [`traits::TransactionStorage`]
//! abstraction; the concrete backend is a single JSON document on disk
//! (see [`json`]). Swapping in another backend would not touch the domain
//! logic.

pub mod json;
pub mod traits;

pub use json::{JsonConnection, TransactionRepository};
pub use traits::TransactionStorage;
