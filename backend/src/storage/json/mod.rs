//! # JSON Storage Module
//!
//! File-based storage for the transaction history: the whole collection
//! lives in a single `transactions.json` document inside the data
//! directory, loaded once at startup and rewritten atomically on every
//! mutation.
//!
//! ## File Format
//!
//! A pretty-printed JSON array of transaction records, newest first,
//! with RFC 3339 timestamps:
//!
//! ```json
//! [
//!   {
//!     "id": "tx-1722934800123-a3f1",
//!     "timestamp": "2025-08-06T14:30:00+07:00",
//!     "cashier_name": "สมชาย",
//!     "shift": "morning",
//!     ...
//!   }
//! ]
//! ```

pub mod connection;
pub mod transaction_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::JsonConnection;
pub use transaction_repository::TransactionRepository;
