//! # Domain Module
//!
//! Business logic for the cash drawer reconciliation tool.
//!
//! ## Module Organization
//!
//! - **reconciliation**: pure drawer arithmetic — denomination totals,
//!   expected cash, difference, and the Perfect/Over/Short classification
//! - **transaction_service**: transaction CRUD, filtering, statistics, and
//!   input validation over the storage layer
//! - **export_service**: CSV export of the transaction history
//!
//! ## Business Rules
//!
//! - A reconciliation must carry a non-empty cashier name before it is saved
//! - Derived amounts (totals, expected cash, difference) are always
//!   recomputed by the service; callers never supply them
//! - The difference classification in `reconciliation` is the single source
//!   of truth for status display and aggregate counts

pub mod export_service;
pub mod reconciliation;
pub mod transaction_service;

pub use export_service::*;
pub use reconciliation::*;
pub use transaction_service::*;

/// The tool keeps all timestamps in Indochina Time.
pub(crate) fn bangkok_offset() -> chrono::FixedOffset {
    chrono::FixedOffset::east_opt(7 * 3600).unwrap() // ICT (UTC+7)
}
