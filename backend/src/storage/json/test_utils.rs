//! Test utilities for storage tests.
//!
//! RAII-based cleanup: the temporary directory lives exactly as long as the
//! environment, so test data is removed even when a test panics.

use anyhow::Result;
use chrono::DateTime;
use shared::{DenominationCount, Shift, Transaction};
use tempfile::TempDir;

use super::connection::JsonConnection;

/// Test environment that provides a temporary data directory and a
/// connection rooted in it.
pub struct TestEnvironment {
    pub connection: JsonConnection,
    /// Base directory path for manual inspection if needed
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = JsonConnection::new(temp_dir.path())?;
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }
}

/// A fully populated record for repository-level tests: opening 1200,
/// revenue 500, PromptPay 200, closing 1500 — a balanced drawer.
pub fn sample_transaction(id: &str, cashier_name: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        timestamp: DateTime::parse_from_rfc3339("2025-08-06T09:30:00+07:00").unwrap(),
        last_modified: None,
        cashier_name: cashier_name.to_string(),
        shift: Shift::Morning,
        note: None,
        opening_cash: 1200.0,
        closing_cash: 1500.0,
        revenue: 500.0,
        promptpay: 200.0,
        expected_cash: 1500.0,
        difference: 0.0,
        opening_denominations: DenominationCount::from_counts([1, 0, 2, 0, 0, 0, 0, 0]),
        closing_denominations: DenominationCount::from_counts([1, 1, 0, 0, 0, 0, 0, 0]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_cleanup() -> Result<()> {
        let base_path;
        {
            let env = TestEnvironment::new()?;
            base_path = env.base_path.clone();
            assert!(base_path.exists());
            // Environment dropped here
        }
        assert!(!base_path.exists());
        Ok(())
    }
}
