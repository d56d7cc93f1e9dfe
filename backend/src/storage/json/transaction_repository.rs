//! JSON-backed transaction repository.

use anyhow::Result;
use log::{debug, info, warn};
use shared::Transaction;
use std::fs;
use std::sync::{Arc, Mutex};

use super::connection::JsonConnection;
use crate::storage::traits::TransactionStorage;

/// File-backed transaction repository.
///
/// The whole collection is held in memory (newest first) and mirrored to
/// `transactions.json` on every mutation. Loading happens exactly once, in
/// the constructor; a missing or unreadable file simply means no history
/// yet.
#[derive(Clone)]
pub struct TransactionRepository {
    connection: JsonConnection,
    transactions: Arc<Mutex<Vec<Transaction>>>,
}

impl TransactionRepository {
    /// Create the repository and load the persisted history.
    pub fn new(connection: JsonConnection) -> Self {
        let transactions = Self::load_transactions(&connection);
        info!(
            "Loaded {} transactions from {}",
            transactions.len(),
            connection.transactions_file_path().display()
        );
        Self {
            connection,
            transactions: Arc::new(Mutex::new(transactions)),
        }
    }

    /// Read the persisted collection. Corruption is recovered locally by
    /// starting over with an empty history — never propagated as a fatal
    /// error.
    fn load_transactions(connection: &JsonConnection) -> Vec<Transaction> {
        let file_path = connection.transactions_file_path();

        if !file_path.exists() {
            return Vec::new();
        }

        let contents = match fs::read_to_string(&file_path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(
                    "Failed to read {}: {}. Starting with an empty history.",
                    file_path.display(),
                    e
                );
                return Vec::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(transactions) => transactions,
            Err(e) => {
                warn!(
                    "Failed to parse {}: {}. Starting with an empty history.",
                    file_path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Write the full collection to disk through a temp file and atomic
    /// rename, so a crash mid-write never leaves a half-written document.
    fn write_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        let file_path = self.connection.transactions_file_path();
        let json_content = serde_json::to_string_pretty(transactions)?;

        let temp_path = file_path.with_extension("tmp");
        fs::write(&temp_path, json_content)?;
        fs::rename(&temp_path, &file_path)?;

        debug!(
            "Persisted {} transactions to {}",
            transactions.len(),
            file_path.display()
        );
        Ok(())
    }
}

impl TransactionStorage for TransactionRepository {
    fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        let mut transactions = self.transactions.lock().unwrap();
        // Newest first: the fresh record becomes index 0
        transactions.insert(0, transaction.clone());
        self.write_transactions(&transactions)
    }

    fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        let transactions = self.transactions.lock().unwrap();
        Ok(transactions
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned())
    }

    fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let transactions = self.transactions.lock().unwrap();
        Ok(transactions.clone())
    }

    fn update_transaction(&self, transaction: &Transaction) -> Result<bool> {
        let mut transactions = self.transactions.lock().unwrap();
        match transactions.iter().position(|t| t.id == transaction.id) {
            Some(index) => {
                transactions[index] = transaction.clone();
                self.write_transactions(&transactions)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_transaction(&self, transaction_id: &str) -> Result<bool> {
        let mut transactions = self.transactions.lock().unwrap();
        let original_len = transactions.len();
        transactions.retain(|t| t.id != transaction_id);

        if transactions.len() < original_len {
            self.write_transactions(&transactions)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn clear_transactions(&self) -> Result<()> {
        let mut transactions = self.transactions.lock().unwrap();
        transactions.clear();
        self.write_transactions(&transactions)
    }
}
