//! Transaction service domain logic for the cash drawer tracker.
//!
//! Owns the persisted reconciliation history and enforces the business
//! rules around it: blocking validation before a save, recomputation of
//! every derived amount on create and edit, and confirmation gating for
//! destructive operations.

use crate::domain::{bangkok_offset, reconciliation};
use crate::storage::json::{JsonConnection, TransactionRepository};
use crate::storage::traits::TransactionStorage;
use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use log::{info, warn};
use shared::{
    CreateTransactionRequest, Transaction, TransactionFilter, TransactionStatistics,
    UpdateTransactionRequest,
};
use std::time::{SystemTime, UNIX_EPOCH};

const MAX_CASHIER_NAME_CHARS: usize = 100;
const MAX_NOTE_CHARS: usize = 256;

/// Validation failures that must be surfaced to the user before any store
/// mutation happens.
#[derive(Debug, thiserror::Error)]
pub enum TransactionValidationError {
    #[error("Cashier name cannot be empty")]
    EmptyCashierName,
    #[error("Cashier name must be at most 100 characters")]
    CashierNameTooLong,
    #[error("Note must be at most 256 characters")]
    NoteTooLong,
}

#[derive(Clone)]
pub struct TransactionService {
    transaction_repository: TransactionRepository,
}

impl TransactionService {
    /// Build the service over a storage connection. The history is loaded
    /// from disk here, once per process.
    pub fn new(connection: JsonConnection) -> Self {
        let transaction_repository = TransactionRepository::new(connection);
        Self {
            transaction_repository,
        }
    }

    /// Save a new reconciliation.
    ///
    /// Totals, expected cash, and difference are computed here from the
    /// submitted denominations and figures; anything the caller might have
    /// computed is ignored. The stored record is returned with its assigned
    /// id and timestamp.
    pub fn create_transaction(&self, request: CreateTransactionRequest) -> Result<Transaction> {
        let cashier_name = validate_cashier_name(&request.cashier_name)?;
        let note = normalize_note(request.note)?;

        let summary = reconciliation::summarize(
            &request.opening_denominations,
            &request.closing_denominations,
            request.revenue,
            request.promptpay,
        );

        let now_millis = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64;
        let mut id = Transaction::generate_id(now_millis);
        // Two saves inside the same millisecond tick get distinct suffixes;
        // the retry makes uniqueness unconditional.
        while self.transaction_repository.get_transaction(&id)?.is_some() {
            id = Transaction::generate_id(now_millis);
        }

        let transaction = Transaction {
            id,
            timestamp: now_in_bangkok(),
            last_modified: None,
            cashier_name,
            shift: request.shift,
            note,
            opening_cash: summary.opening_cash,
            closing_cash: summary.closing_cash,
            revenue: request.revenue,
            promptpay: request.promptpay,
            expected_cash: summary.expected_cash,
            difference: summary.difference,
            opening_denominations: request.opening_denominations,
            closing_denominations: request.closing_denominations,
        };

        self.transaction_repository.store_transaction(&transaction)?;
        info!(
            "Saved reconciliation {} for cashier '{}' ({:?})",
            transaction.id, transaction.cashier_name, summary.status
        );
        Ok(transaction)
    }

    /// Apply a typed patch to an existing reconciliation.
    ///
    /// Returns `false` (a no-op, not an error) when the id is unknown.
    /// After the merge every derived amount is recomputed from the stored
    /// denominations and figures, and `last_modified` is stamped.
    pub fn update_transaction(&self, id: &str, patch: UpdateTransactionRequest) -> Result<bool> {
        let mut transaction = match self.transaction_repository.get_transaction(id)? {
            Some(transaction) => transaction,
            None => {
                warn!("Update requested for unknown transaction {}", id);
                return Ok(false);
            }
        };

        if let Some(cashier_name) = patch.cashier_name {
            transaction.cashier_name = validate_cashier_name(&cashier_name)?;
        }
        if let Some(shift) = patch.shift {
            transaction.shift = shift;
        }
        if let Some(note) = patch.note {
            transaction.note = normalize_note(Some(note))?;
        }
        if let Some(revenue) = patch.revenue {
            transaction.revenue = revenue;
        }
        if let Some(promptpay) = patch.promptpay {
            transaction.promptpay = promptpay;
        }
        if let Some(opening_denominations) = patch.opening_denominations {
            transaction.opening_denominations = opening_denominations;
        }
        if let Some(closing_denominations) = patch.closing_denominations {
            transaction.closing_denominations = closing_denominations;
        }

        let summary = reconciliation::summarize(
            &transaction.opening_denominations,
            &transaction.closing_denominations,
            transaction.revenue,
            transaction.promptpay,
        );
        transaction.opening_cash = summary.opening_cash;
        transaction.closing_cash = summary.closing_cash;
        transaction.expected_cash = summary.expected_cash;
        transaction.difference = summary.difference;
        transaction.last_modified = Some(now_in_bangkok());

        let updated = self.transaction_repository.update_transaction(&transaction)?;
        if updated {
            info!("Updated reconciliation {}", id);
        }
        Ok(updated)
    }

    /// Delete a single reconciliation. Returns `false` when the id is
    /// unknown.
    pub fn delete_transaction(&self, id: &str) -> Result<bool> {
        let deleted = self.transaction_repository.delete_transaction(id)?;
        if deleted {
            info!("Deleted reconciliation {}", id);
        } else {
            warn!("Delete requested for unknown transaction {}", id);
        }
        Ok(deleted)
    }

    pub fn get_transaction(&self, id: &str) -> Result<Option<Transaction>> {
        self.transaction_repository.get_transaction(id)
    }

    /// All reconciliations, newest first.
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.transaction_repository.list_transactions()
    }

    /// Filter the history. Present criteria are ANDed; absent or blank
    /// criteria do not constrain. The store itself is never mutated.
    pub fn filter_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut transactions = self.transaction_repository.list_transactions()?;

        if let Some(date) = filter.date {
            transactions
                .retain(|t| t.timestamp.with_timezone(&bangkok_offset()).date_naive() == date);
        }
        if let Some(shift) = filter.shift {
            transactions.retain(|t| t.shift == shift);
        }
        if let Some(cashier) = filter.cashier.as_deref() {
            let needle = cashier.trim().to_lowercase();
            if !needle.is_empty() {
                transactions.retain(|t| t.cashier_name.to_lowercase().contains(&needle));
            }
        }

        Ok(transactions)
    }

    /// Aggregate statistics over the whole history in a single pass.
    pub fn statistics(&self) -> Result<TransactionStatistics> {
        let transactions = self.transaction_repository.list_transactions()?;

        let mut stats = TransactionStatistics {
            total_transactions: transactions.len(),
            ..TransactionStatistics::default()
        };

        for transaction in &transactions {
            stats.total_revenue += reconciliation::finite_or_zero(transaction.revenue);
            stats.total_promptpay += reconciliation::finite_or_zero(transaction.promptpay);

            match reconciliation::classify(transaction.difference) {
                shared::DrawerStatus::Perfect => stats.perfect_count += 1,
                shared::DrawerStatus::Over => stats.over_count += 1,
                shared::DrawerStatus::Short => stats.short_count += 1,
            }
        }

        Ok(stats)
    }

    /// Empty the whole history. The caller is responsible for prompting the
    /// user; an unconfirmed call does nothing and returns `false`.
    pub fn clear_all(&self, confirmed: bool) -> Result<bool> {
        if !confirmed {
            info!("Clear-all declined, history left untouched");
            return Ok(false);
        }
        self.transaction_repository.clear_transactions()?;
        info!("Cleared the whole transaction history");
        Ok(true)
    }
}

fn now_in_bangkok() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&bangkok_offset())
}

fn validate_cashier_name(raw: &str) -> Result<String> {
    let cashier_name = raw.trim().to_string();
    if cashier_name.is_empty() {
        return Err(TransactionValidationError::EmptyCashierName.into());
    }
    if cashier_name.chars().count() > MAX_CASHIER_NAME_CHARS {
        return Err(TransactionValidationError::CashierNameTooLong.into());
    }
    Ok(cashier_name)
}

/// An empty or whitespace-only note is stored as no note at all.
fn normalize_note(note: Option<String>) -> Result<Option<String>> {
    match note {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else if trimmed.chars().count() > MAX_NOTE_CHARS {
                Err(TransactionValidationError::NoteTooLong.into())
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::test_utils::TestEnvironment;
    use shared::{DenominationCount, DrawerStatus, Shift};

    fn setup_test_service() -> Result<(TransactionService, TestEnvironment)> {
        let env = TestEnvironment::new()?;
        let service = TransactionService::new(env.connection.clone());
        Ok((service, env))
    }

    fn balanced_request(cashier_name: &str) -> CreateTransactionRequest {
        // Opening 1200, revenue 500, PromptPay 200, closing 1500 → perfect
        CreateTransactionRequest {
            cashier_name: cashier_name.to_string(),
            shift: Shift::Morning,
            note: None,
            revenue: 500.0,
            promptpay: 200.0,
            opening_denominations: DenominationCount::from_counts([1, 0, 2, 0, 0, 0, 0, 0]),
            closing_denominations: DenominationCount::from_counts([1, 1, 0, 0, 0, 0, 0, 0]),
        }
    }

    #[test]
    fn test_create_computes_derived_amounts() -> Result<()> {
        let (service, _env) = setup_test_service()?;

        let transaction = service.create_transaction(balanced_request("สมชาย"))?;
        assert_eq!(transaction.opening_cash, 1200.0);
        assert_eq!(transaction.closing_cash, 1500.0);
        assert_eq!(transaction.expected_cash, 1500.0);
        assert_eq!(transaction.difference, 0.0);
        assert!(transaction.id.starts_with("tx-"));
        assert!(transaction.last_modified.is_none());

        let retrieved = service.get_transaction(&transaction.id)?;
        assert_eq!(retrieved, Some(transaction));
        Ok(())
    }

    #[test]
    fn test_create_rejects_blank_cashier_name() -> Result<()> {
        let (service, _env) = setup_test_service()?;

        let result = service.create_transaction(balanced_request("   "));
        assert!(result.is_err());
        assert!(service.list_transactions()?.is_empty(), "nothing stored");
        Ok(())
    }

    #[test]
    fn test_create_prepends_newest_first() -> Result<()> {
        let (service, _env) = setup_test_service()?;

        let first = service.create_transaction(balanced_request("A"))?;
        let second = service.create_transaction(balanced_request("B"))?;

        let all = service.list_transactions()?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
        assert_ne!(first.id, second.id);
        Ok(())
    }

    #[test]
    fn test_update_recomputes_difference_and_stamps_last_modified() -> Result<()> {
        let (service, _env) = setup_test_service()?;
        let transaction = service.create_transaction(balanced_request("สมชาย"))?;

        // Drop the closing count to 1000: expected stays 1500, drawer short 500
        let patch = UpdateTransactionRequest {
            closing_denominations: Some(DenominationCount::from_counts([1, 0, 0, 0, 0, 0, 0, 0])),
            note: Some("นับใหม่ตอนปิดร้าน".to_string()),
            ..UpdateTransactionRequest::default()
        };
        assert!(service.update_transaction(&transaction.id, patch)?);

        let updated = service.get_transaction(&transaction.id)?.unwrap();
        assert_eq!(updated.closing_cash, 1000.0);
        assert_eq!(updated.expected_cash, 1500.0);
        assert_eq!(updated.difference, -500.0);
        assert_eq!(updated.note.as_deref(), Some("นับใหม่ตอนปิดร้าน"));
        assert!(updated.last_modified.is_some());
        assert_eq!(updated.timestamp, transaction.timestamp);
        Ok(())
    }

    #[test]
    fn test_update_unknown_id_is_noop() -> Result<()> {
        let (service, _env) = setup_test_service()?;
        let updated =
            service.update_transaction("tx-0-dead", UpdateTransactionRequest::default())?;
        assert!(!updated);
        Ok(())
    }

    #[test]
    fn test_delete_then_get_absent() -> Result<()> {
        let (service, _env) = setup_test_service()?;
        let transaction = service.create_transaction(balanced_request("สมชาย"))?;

        assert!(service.delete_transaction(&transaction.id)?);
        assert!(service.get_transaction(&transaction.id)?.is_none());
        assert!(!service.delete_transaction(&transaction.id)?);
        Ok(())
    }

    #[test]
    fn test_filter_by_shift_preserves_order() -> Result<()> {
        let (service, _env) = setup_test_service()?;

        let mut night = balanced_request("A");
        night.shift = Shift::Night;
        service.create_transaction(night)?;
        let morning_1 = service.create_transaction(balanced_request("B"))?;
        let morning_2 = service.create_transaction(balanced_request("C"))?;

        let filter = TransactionFilter {
            shift: Some(Shift::Morning),
            ..TransactionFilter::default()
        };
        let filtered = service.filter_transactions(&filter)?;
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].id, morning_2.id);
        assert_eq!(filtered[1].id, morning_1.id);
        Ok(())
    }

    #[test]
    fn test_filter_by_cashier_substring_case_insensitive() -> Result<()> {
        let (service, _env) = setup_test_service()?;
        service.create_transaction(balanced_request("Supaporn"))?;
        service.create_transaction(balanced_request("Anan"))?;

        let filter = TransactionFilter {
            cashier: Some("PORN".to_string()),
            ..TransactionFilter::default()
        };
        let filtered = service.filter_transactions(&filter)?;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].cashier_name, "Supaporn");
        Ok(())
    }

    #[test]
    fn test_filter_by_date_matches_same_day() -> Result<()> {
        let (service, _env) = setup_test_service()?;
        let transaction = service.create_transaction(balanced_request("สมชาย"))?;

        let today = transaction
            .timestamp
            .with_timezone(&bangkok_offset())
            .date_naive();
        let filter = TransactionFilter {
            date: Some(today),
            ..TransactionFilter::default()
        };
        assert_eq!(service.filter_transactions(&filter)?.len(), 1);

        let filter = TransactionFilter {
            date: Some(today.pred_opt().unwrap()),
            ..TransactionFilter::default()
        };
        assert!(service.filter_transactions(&filter)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_filter_returns_everything_in_order() -> Result<()> {
        let (service, _env) = setup_test_service()?;
        service.create_transaction(balanced_request("A"))?;
        service.create_transaction(balanced_request("B"))?;

        let filtered = service.filter_transactions(&TransactionFilter::default())?;
        assert_eq!(filtered, service.list_transactions()?);
        Ok(())
    }

    #[test]
    fn test_statistics_counts_partition_history() -> Result<()> {
        let (service, _env) = setup_test_service()?;

        service.create_transaction(balanced_request("A"))?; // perfect

        let mut short = balanced_request("B"); // closing 1000 vs expected 1500
        short.closing_denominations = DenominationCount::from_counts([1, 0, 0, 0, 0, 0, 0, 0]);
        service.create_transaction(short)?;

        let mut over = balanced_request("C"); // closing 2000 vs expected 1500
        over.closing_denominations = DenominationCount::from_counts([2, 0, 0, 0, 0, 0, 0, 0]);
        service.create_transaction(over)?;

        let stats = service.statistics()?;
        assert_eq!(stats.total_transactions, 3);
        assert_eq!(stats.perfect_count, 1);
        assert_eq!(stats.over_count, 1);
        assert_eq!(stats.short_count, 1);
        assert_eq!(
            stats.perfect_count + stats.over_count + stats.short_count,
            stats.total_transactions
        );
        assert_eq!(stats.total_revenue, 1500.0);
        assert_eq!(stats.total_promptpay, 600.0);
        Ok(())
    }

    #[test]
    fn test_clear_all_requires_confirmation() -> Result<()> {
        let (service, _env) = setup_test_service()?;
        service.create_transaction(balanced_request("A"))?;
        service.create_transaction(balanced_request("B"))?;
        service.create_transaction(balanced_request("C"))?;

        assert!(!service.clear_all(false)?);
        assert_eq!(service.list_transactions()?.len(), 3);

        assert!(service.clear_all(true)?);
        assert!(service.list_transactions()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_history_survives_restart() -> Result<()> {
        let (service, env) = setup_test_service()?;
        let transaction = service.create_transaction(balanced_request("สมชาย"))?;

        // A fresh service over the same directory sees the stored record
        let reopened = TransactionService::new(env.connection.clone());
        let all = reopened.list_transactions()?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], transaction);

        let status = reconciliation::classify(all[0].difference);
        assert_eq!(status, DrawerStatus::Perfect);
        Ok(())
    }
}
