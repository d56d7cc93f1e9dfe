//! # Cash Drawer Backend
//!
//! Contains all non-UI logic for the cash drawer reconciliation tool.
//!
//! This crate serves as the orchestration layer that brings together:
//! - **Domain**: reconciliation arithmetic and transaction business logic
//! - **Storage**: durable persistence of the transaction history
//!
//! The backend is UI-agnostic: a desktop shell, a web view, or a test
//! harness can all drive it the same way.
//!
//! ## Architecture
//!
//! ```text
//! UI Layer (counting form, history table)
//!     ↓
//! Domain Layer (reconciliation engine, services)
//!     ↓
//! Storage Layer (JSON-backed transaction repository)
//! ```

pub mod domain;
pub mod storage;

use anyhow::Result;
use log::info;

use crate::domain::{ExportService, TransactionService};
use crate::storage::json::JsonConnection;

/// Main application state that holds all services.
#[derive(Clone)]
pub struct AppState {
    pub transaction_service: TransactionService,
    pub export_service: ExportService,
}

impl AppState {
    /// Wire the services over an explicit storage connection.
    ///
    /// The transaction history is loaded from disk here, once; the state
    /// should be constructed a single time per process and handed to
    /// whichever controller needs it.
    pub fn new(connection: JsonConnection) -> Self {
        let transaction_service = TransactionService::new(connection);
        let export_service = ExportService::new();
        Self {
            transaction_service,
            export_service,
        }
    }
}

/// Initialize the backend against the default data directory.
pub fn initialize_backend() -> Result<AppState> {
    info!("Setting up storage");
    let connection = JsonConnection::new_default()?;

    info!("Setting up domain model");
    Ok(AppState::new(connection))
}
