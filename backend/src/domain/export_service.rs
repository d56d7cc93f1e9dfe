//! Export service domain logic for the cash drawer tracker.
//!
//! Generates the CSV export of the transaction history and, when asked,
//! writes it to disk. The UI only handles presentation concerns (picking a
//! directory, offering the download).

use crate::domain::{bangkok_offset, reconciliation, TransactionService};
use anyhow::Result;
use chrono::{DateTime, Datelike, FixedOffset};
use log::{error, info};
use shared::{ExportDataResponse, ExportToPathRequest, ExportToPathResponse};
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fixed Thai header row of the export file. Column order is part of the
/// format: date, time, shift, cashier, opening, revenue, PromptPay,
/// closing, difference, status, note.
const CSV_HEADER: [&str; 11] = [
    "วันที่",
    "เวลา",
    "กะ",
    "ผู้ทำรายการ",
    "เงินยกมา",
    "รายรับ",
    "พร้อมเพย์",
    "เงินปิดกะ",
    "ผลต่าง",
    "สถานะ",
    "หมายเหตุ",
];

/// One flat export row: dates, shift, and status already rendered as the
/// Thai text the file carries. Field order matches [`CSV_HEADER`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub date: String,
    pub time: String,
    pub shift: String,
    pub cashier: String,
    pub opening: String,
    pub revenue: String,
    pub promptpay: String,
    pub closing: String,
    pub difference: String,
    pub status: String,
    pub note: String,
}

/// Export service that handles all export-related business logic.
#[derive(Clone)]
pub struct ExportService {
    // No internal state needed for now
}

impl ExportService {
    pub fn new() -> Self {
        Self {}
    }

    /// Flatten the whole history into export rows, one per transaction,
    /// in current store order (newest first).
    pub fn export_rows(&self, transaction_service: &TransactionService) -> Result<Vec<ExportRow>> {
        let transactions = transaction_service.list_transactions()?;

        let rows = transactions
            .iter()
            .map(|transaction| {
                let local_time = transaction.timestamp.with_timezone(&bangkok_offset());
                ExportRow {
                    date: format_thai_date(&local_time),
                    time: local_time.format("%H:%M:%S").to_string(),
                    shift: transaction.shift.thai_name().to_string(),
                    cashier: transaction.cashier_name.clone(),
                    opening: format!("{:.2}", transaction.opening_cash),
                    revenue: format!("{:.2}", transaction.revenue),
                    promptpay: format!("{:.2}", transaction.promptpay),
                    closing: format!("{:.2}", transaction.closing_cash),
                    difference: format!("{:.2}", transaction.difference),
                    status: reconciliation::classify(transaction.difference)
                        .thai_text()
                        .to_string(),
                    note: transaction.note.clone().unwrap_or_default(),
                }
            })
            .collect();

        Ok(rows)
    }

    /// Render the whole history as CSV.
    ///
    /// The content is UTF-8 with a byte-order mark so spreadsheet software
    /// picks up the Thai text correctly; the filename carries a millisecond
    /// timestamp.
    pub fn export_transactions_csv(
        &self,
        transaction_service: &TransactionService,
    ) -> Result<ExportDataResponse> {
        let rows = self.export_rows(transaction_service)?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;

        for row in &rows {
            writer.write_record(&[
                &row.date,
                &row.time,
                &row.shift,
                &row.cashier,
                &row.opening,
                &row.revenue,
                &row.promptpay,
                &row.closing,
                &row.difference,
                &row.status,
                &row.note,
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("finalize csv: {}", e))?;
        let csv_content = format!("\u{feff}{}", String::from_utf8(bytes)?);

        let now_millis = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
        let filename = format!("cash_drawer_transactions_{}.csv", now_millis);

        info!(
            "Exported {} transactions as CSV ({} bytes) with filename: {}",
            rows.len(),
            csv_content.len(),
            filename
        );

        Ok(ExportDataResponse {
            csv_content,
            filename,
            transaction_count: rows.len(),
        })
    }

    /// Write the export to a directory on disk.
    ///
    /// A caller-supplied directory is sanitized first; without one the
    /// user's documents directory is used (home directory as fallback).
    /// File-system failures come back as an unsuccessful response rather
    /// than an error, so the UI can show the message as-is.
    pub fn export_to_path(
        &self,
        transaction_service: &TransactionService,
        request: ExportToPathRequest,
    ) -> Result<ExportToPathResponse> {
        let export = self.export_transactions_csv(transaction_service)?;

        let export_dir = match request.custom_path {
            Some(custom_path) if !custom_path.trim().is_empty() => {
                std::path::PathBuf::from(self.sanitize_path(&custom_path))
            }
            _ => match dirs::document_dir().or_else(dirs::home_dir) {
                Some(dir) => dir,
                None => {
                    error!("Could not determine default export directory");
                    return Ok(ExportToPathResponse {
                        success: false,
                        message: "Failed to determine export directory".to_string(),
                        file_path: String::new(),
                        transaction_count: 0,
                    });
                }
            },
        };

        let file_path = export_dir.join(&export.filename);

        if let Err(e) = fs::create_dir_all(&export_dir) {
            error!("Failed to create export directory {:?}: {}", export_dir, e);
            return Ok(ExportToPathResponse {
                success: false,
                message: format!("Failed to create export directory: {}", e),
                file_path: export_dir.to_string_lossy().to_string(),
                transaction_count: 0,
            });
        }

        match fs::write(&file_path, &export.csv_content) {
            Ok(_) => {
                let file_path_str = file_path.to_string_lossy().to_string();
                info!(
                    "Exported {} transactions to: {}",
                    export.transaction_count, file_path_str
                );
                Ok(ExportToPathResponse {
                    success: true,
                    message: format!("File exported successfully to: {}", file_path_str),
                    file_path: file_path_str,
                    transaction_count: export.transaction_count,
                })
            }
            Err(e) => {
                error!("Failed to write export file to {:?}: {}", file_path, e);
                Ok(ExportToPathResponse {
                    success: false,
                    message: format!("Failed to write export file: {}", e),
                    file_path: file_path.to_string_lossy().to_string(),
                    transaction_count: 0,
                })
            }
        }
    }

    /// Basic path sanitization to handle common user input issues.
    fn sanitize_path(&self, path: &str) -> String {
        let mut cleaned = path.trim().to_string();

        // Remove surrounding quotes (single or double)
        if (cleaned.starts_with('"') && cleaned.ends_with('"'))
            || (cleaned.starts_with('\'') && cleaned.ends_with('\''))
        {
            cleaned = cleaned[1..cleaned.len() - 1].to_string();
        }

        cleaned = cleaned.trim().to_string();

        // Handle escaped spaces (common on some systems)
        cleaned = cleaned.replace("\\ ", " ");

        // Remove any trailing slashes/backslashes
        while cleaned.ends_with('/') || cleaned.ends_with('\\') {
            cleaned.pop();
        }

        // Handle tilde expansion for home directory
        if cleaned.starts_with('~') {
            if let Some(home) = dirs::home_dir() {
                if cleaned == "~" {
                    cleaned = home.to_string_lossy().to_string();
                } else if cleaned.starts_with("~/") || cleaned.starts_with("~\\") {
                    cleaned = home.join(&cleaned[2..]).to_string_lossy().to_string();
                }
            }
        }

        cleaned
    }
}

impl Default for ExportService {
    fn default() -> Self {
        Self::new()
    }
}

/// dd/mm/yyyy with the Buddhist-era year, matching what the Thai locale
/// renders for these records.
fn format_thai_date(date: &DateTime<FixedOffset>) -> String {
    format!(
        "{:02}/{:02}/{}",
        date.day(),
        date.month(),
        date.year() + 543
    )
}
