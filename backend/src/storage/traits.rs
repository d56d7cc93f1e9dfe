//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use shared::Transaction;

/// Trait defining the interface for transaction storage operations.
///
/// The store owns the ordering: new records go to the front, and
/// `list_transactions` returns the collection newest first. All operations
/// are synchronous and fully commit before returning.
pub trait TransactionStorage: Send + Sync {
    /// Store a new transaction at the front of the collection.
    fn store_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Retrieve a specific transaction by ID.
    fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>>;

    /// List all transactions in store order (most recent first).
    fn list_transactions(&self) -> Result<Vec<Transaction>>;

    /// Replace an existing transaction, matched by its ID.
    /// Returns false when no transaction with that ID exists.
    fn update_transaction(&self, transaction: &Transaction) -> Result<bool>;

    /// Delete a single transaction.
    /// Returns true if the transaction was found and deleted, false otherwise.
    fn delete_transaction(&self, transaction_id: &str) -> Result<bool>;

    /// Remove every transaction from the store.
    fn clear_transactions(&self) -> Result<()>;
}
