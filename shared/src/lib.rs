use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fixed Thai Baht denomination table, highest face value first.
///
/// The order is meaningful: counting forms, exports, and
/// `DenominationCount` all follow it.
pub const DENOMINATIONS: [u32; 8] = [1000, 500, 100, 50, 20, 10, 5, 1];

/// Per-denomination note/coin counts for one side of a drawer count.
///
/// Stored as a fixed-size array aligned with [`DENOMINATIONS`] and
/// serialized transparently as an eight-element array. Old records
/// missing a count default to all zeroes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DenominationCount([u32; DENOMINATIONS.len()]);

impl DenominationCount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from counts given in [`DENOMINATIONS`] order.
    pub fn from_counts(counts: [u32; DENOMINATIONS.len()]) -> Self {
        Self(counts)
    }

    /// Count for a single face value; unknown denominations count as zero.
    pub fn count_for(&self, denomination: u32) -> u32 {
        DENOMINATIONS
            .iter()
            .position(|d| *d == denomination)
            .map(|i| self.0[i])
            .unwrap_or(0)
    }

    /// Set the count for a face value. Unknown denominations are ignored,
    /// mirroring the lenient input policy of the counting form.
    pub fn set_count(&mut self, denomination: u32, count: u32) {
        if let Some(i) = DENOMINATIONS.iter().position(|d| *d == denomination) {
            self.0[i] = count;
        }
    }

    /// Iterate `(face value, count)` pairs, highest face value first.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        DENOMINATIONS.iter().copied().zip(self.0.iter().copied())
    }
}

/// Work period a reconciliation is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Afternoon,
    Night,
}

impl Shift {
    /// Thai display name, used on receipts and in CSV export.
    pub fn thai_name(&self) -> &'static str {
        match self {
            Shift::Morning => "กะเช้า",
            Shift::Afternoon => "กะบ่าย",
            Shift::Night => "กะดึก",
        }
    }

    /// Parse from the lowercase form used in forms and persisted records.
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "morning" => Ok(Shift::Morning),
            "afternoon" => Ok(Shift::Afternoon),
            "night" => Ok(Shift::Night),
            _ => Err(format!("Invalid shift: {}", s)),
        }
    }
}

/// Three-way classification of a drawer difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawerStatus {
    /// |difference| below the monetary comparison tolerance.
    Perfect,
    /// More cash counted than expected.
    Over,
    /// Less cash counted than expected.
    Short,
}

impl DrawerStatus {
    /// Thai status text, used wherever a difference is shown or exported.
    pub fn thai_text(&self) -> &'static str {
        match self {
            DrawerStatus::Perfect => "ถูกต้อง",
            DrawerStatus::Over => "เงินเกิน",
            DrawerStatus::Short => "เงินขาด",
        }
    }
}

/// One persisted drawer reconciliation.
///
/// All monetary fields default to zero when absent so records written by
/// older versions load without coercion surprises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique id in the format `tx-<epoch_millis>-<suffix>`.
    pub id: String,
    /// Creation instant (ICT), immutable after creation.
    pub timestamp: DateTime<FixedOffset>,
    /// Instant of the last edit; absent until the record is first edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<FixedOffset>>,
    pub cashier_name: String,
    pub shift: Shift,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub opening_cash: f64,
    #[serde(default)]
    pub closing_cash: f64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub promptpay: f64,
    #[serde(default)]
    pub expected_cash: f64,
    /// Always `closing_cash - expected_cash`; recomputed on every edit.
    #[serde(default)]
    pub difference: f64,
    #[serde(default)]
    pub opening_denominations: DenominationCount,
    #[serde(default)]
    pub closing_denominations: DenominationCount,
}

/// Payload for saving a new reconciliation.
///
/// Derived amounts (totals, expected cash, difference) are intentionally
/// absent: the backend computes them from the denominations and figures
/// given here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub cashier_name: String,
    pub shift: Shift,
    pub note: Option<String>,
    pub revenue: f64,
    pub promptpay: f64,
    pub opening_denominations: DenominationCount,
    pub closing_denominations: DenominationCount,
}

/// Typed patch for editing an existing reconciliation.
///
/// Every field is optional; absent fields are left unchanged. Unknown
/// fields cannot be smuggled in — only what is listed here can change.
/// Setting `note` to an empty string clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    pub cashier_name: Option<String>,
    pub shift: Option<Shift>,
    pub note: Option<String>,
    pub revenue: Option<f64>,
    pub promptpay: Option<f64>,
    pub opening_denominations: Option<DenominationCount>,
    pub closing_denominations: Option<DenominationCount>,
}

/// Filter criteria for the transaction history view.
///
/// Present criteria are ANDed; `None` (or a blank cashier string) means
/// "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Match records created on this calendar day (ICT).
    pub date: Option<NaiveDate>,
    pub shift: Option<Shift>,
    /// Case-insensitive substring match on the cashier name.
    pub cashier: Option<String>,
}

/// Aggregate statistics over the whole transaction history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionStatistics {
    pub total_transactions: usize,
    pub total_revenue: f64,
    pub total_promptpay: f64,
    pub perfect_count: usize,
    pub over_count: usize,
    pub short_count: usize,
}

/// Generated CSV export content plus its suggested filename.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDataResponse {
    pub csv_content: String,
    pub filename: String,
    pub transaction_count: usize,
}

/// Request for exporting directly to a directory on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportToPathRequest {
    /// Target directory; the default documents directory when absent.
    pub custom_path: Option<String>,
}

/// Outcome of an export-to-path operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportToPathResponse {
    pub success: bool,
    pub message: String,
    pub file_path: String,
    pub transaction_count: usize,
}

impl Transaction {
    /// Generate a transaction id from a millisecond timestamp.
    /// Format: `tx-<epoch_millis>-<4 hex chars>`, e.g. `tx-1722934800123-a3f1`.
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("tx-{}-{}", epoch_millis, Self::generate_suffix(4))
    }

    /// Parse a transaction id and return its embedded timestamp.
    pub fn parse_id(id: &str) -> Result<u64, TransactionIdError> {
        let parts: Vec<&str> = id.split('-').collect();
        if parts.len() != 3 || parts[0] != "tx" {
            return Err(TransactionIdError::InvalidFormat);
        }
        parts[1]
            .parse::<u64>()
            .map_err(|_| TransactionIdError::InvalidTimestamp)
    }

    /// Extract the creation timestamp embedded in this record's id.
    pub fn extract_timestamp(&self) -> Result<u64, TransactionIdError> {
        Self::parse_id(&self.id)
    }

    fn generate_suffix(len: usize) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_nanos();
        format!("{:x}", now % (16_u128.pow(len as u32)))
            .chars()
            .take(len)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionIdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for TransactionIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionIdError::InvalidFormat => write!(f, "Invalid transaction ID format"),
            TransactionIdError::InvalidTimestamp => {
                write!(f, "Invalid timestamp in transaction ID")
            }
        }
    }
}

impl std::error::Error for TransactionIdError {}
