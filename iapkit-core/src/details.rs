//! Unified purchase records published on the update stream.

use crate::error::{PlatformError, ERROR_SOURCE};
use crate::native::{NativeTransaction, Sk2Transaction, TransactionState};

/// `SKErrorPaymentCancelled`.
const PAYMENT_CANCELLED_CODE: i64 = 2;

/// Lifecycle status of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum PurchaseStatus {
    /// Still being processed.
    Pending,
    /// Paid for; content should be delivered.
    Purchased,
    /// Failed; see `PurchaseDetails::error`.
    Error,
    /// Re-delivered by a restore.
    Restored,
    /// Cancelled by the user.
    Canceled,
}

/// Data needed to verify a purchase.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct VerificationData {
    /// Data for on-device verification.
    pub local_verification_data: String,
    /// Data for server-side verification.
    pub server_verification_data: String,
    /// Always [`ERROR_SOURCE`] for this platform.
    pub source: String,
}

impl VerificationData {
    fn same(data: String) -> Self {
        Self {
            local_verification_data: data.clone(),
            server_verification_data: data,
            source: ERROR_SOURCE.to_string(),
        }
    }
}

/// A purchase as reported to the application.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PurchaseDetails {
    /// Native transaction identifier, absent while purchasing.
    pub purchase_id: Option<String>,
    /// Product identifier.
    pub product_id: String,
    /// Verification payload.
    pub verification_data: VerificationData,
    /// Transaction time in milliseconds since the epoch.
    pub transaction_date: Option<String>,
    /// Current status.
    pub status: PurchaseStatus,
    /// Failure reason when `status` is `Error`.
    pub error: Option<PlatformError>,
    /// Whether the application must call `complete_purchase`.
    pub pending_complete_purchase: bool,
}

fn millis(seconds: f64) -> String {
    // whole milliseconds; sub-millisecond precision is never reported
    #[allow(clippy::cast_possible_truncation)]
    let millis = (seconds * 1000.0).round() as i64;
    millis.to_string()
}

fn transaction_status(transaction: &NativeTransaction) -> PurchaseStatus {
    match transaction.state {
        TransactionState::Purchasing | TransactionState::Deferred => PurchaseStatus::Pending,
        TransactionState::Purchased => PurchaseStatus::Purchased,
        TransactionState::Restored => PurchaseStatus::Restored,
        TransactionState::Failed => match &transaction.error {
            Some(error) if error.code == PAYMENT_CANCELLED_CODE => PurchaseStatus::Canceled,
            _ => PurchaseStatus::Error,
        },
        TransactionState::Unspecified => PurchaseStatus::Error,
    }
}

impl PurchaseDetails {
    /// Maps a legacy queue transaction, attaching the base64 app receipt.
    #[must_use]
    pub fn from_transaction(transaction: NativeTransaction, receipt: &str) -> Self {
        let status = transaction_status(&transaction);
        let error = match (&transaction.error, status) {
            (Some(error), _) => Some(PlatformError::from(error)),
            (None, PurchaseStatus::Error) => Some(PlatformError::new(
                "unknown_transaction_state",
                "the transaction failed without a native error",
                None,
            )),
            (None, _) => None,
        };
        Self {
            purchase_id: transaction.transaction_identifier,
            product_id: transaction.product_identifier,
            verification_data: VerificationData::same(receipt.to_string()),
            transaction_date: transaction.transaction_timestamp.map(millis),
            status,
            error,
            pending_complete_purchase: transaction.state != TransactionState::Purchasing,
        }
    }

    /// Maps a StoreKit 2 transaction. Its JWS is the verification payload.
    #[must_use]
    pub fn from_sk2_transaction(transaction: Sk2Transaction) -> Self {
        let status = if transaction.restoring {
            PurchaseStatus::Restored
        } else {
            PurchaseStatus::Purchased
        };
        Self {
            purchase_id: Some(transaction.id.to_string()),
            product_id: transaction.product_id,
            verification_data: VerificationData::same(
                transaction.jws_representation.unwrap_or_default(),
            ),
            transaction_date: transaction.purchase_date.map(millis),
            status,
            error: None,
            pending_complete_purchase: true,
        }
    }
}
