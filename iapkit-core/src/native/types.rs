//! Records exchanged with the native StoreKit layer.

use crate::error::{PlatformError, StoreKitError};
use crate::types::ProductType;

/// A product as returned by the native catalog (`Product`).
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct NativeProduct {
    /// Product identifier configured in App Store Connect.
    pub id: String,
    /// Localized display name.
    pub display_name: String,
    /// Localized description.
    pub description: String,
    /// Localized, formatted price.
    pub display_price: String,
    /// Decimal price.
    pub price: f64,
    /// ISO 4217 currency code of the storefront.
    pub currency_code: String,
    /// Currency symbol of the storefront locale.
    pub currency_symbol: String,
    /// Kind of product.
    pub product_type: ProductType,
}

/// Outcome of a native `Product.purchase` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum NativePurchaseResult {
    /// The purchase succeeded with a verified transaction.
    Success,
    /// The purchase succeeded but the transaction failed verification.
    Unverified,
    /// The user cancelled the purchase sheet.
    UserCancelled,
    /// The purchase awaits approval (e.g. Ask to Buy).
    Pending,
}

/// Signed promotional offer attached to a native purchase.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PromotionalOfferPurchaseMessage {
    /// Identifier of the subscription key used to sign the offer.
    pub key_id: String,
    /// Single-use nonce (UUID).
    pub nonce: String,
    /// Base64 signature produced by the developer's server.
    pub signature: String,
    /// Signature creation time in milliseconds since the epoch.
    pub timestamp: i64,
    /// Promotional offer identifier.
    pub promotional_offer_id: String,
}

/// Options passed to a native `Product.purchase` call.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PurchaseOptions {
    /// Number of units purchased.
    pub quantity: i64,
    /// Opaque account token associated with the transaction.
    pub app_account_token: Option<String>,
    /// Win-back offer to redeem.
    pub win_back_offer_id: Option<String>,
    /// Signed promotional offer to redeem.
    pub promotional_offer: Option<PromotionalOfferPurchaseMessage>,
}

impl Default for PurchaseOptions {
    fn default() -> Self {
        Self {
            quantity: 1,
            app_account_token: None,
            win_back_offer_id: None,
            promotional_offer: None,
        }
    }
}

/// Signed discount attached to a legacy payment (`SKPaymentDiscount`).
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PaymentDiscount {
    /// Discount offer identifier.
    pub identifier: String,
    /// Identifier of the subscription key used to sign the offer.
    pub key_identifier: String,
    /// Single-use nonce (UUID).
    pub nonce: String,
    /// Base64 signature.
    pub signature: String,
    /// Signature creation time in milliseconds since the epoch.
    pub timestamp: i64,
}

/// A payment submitted to the legacy queue (`SKPayment`).
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PaymentRequest {
    /// Product identifier.
    pub product_identifier: String,
    /// Opaque user identifier.
    pub application_username: Option<String>,
    /// Number of units purchased.
    pub quantity: i64,
    /// Whether the sandbox should simulate an Ask to Buy flow.
    pub simulates_ask_to_buy: bool,
    /// Signed discount to redeem.
    pub payment_discount: Option<PaymentDiscount>,
}

/// State of a legacy queue transaction (`SKPaymentTransactionState`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum TransactionState {
    /// The transaction is being processed.
    Purchasing,
    /// The transaction is paid for; the app should deliver content.
    Purchased,
    /// The transaction failed.
    Failed,
    /// A previously purchased transaction was restored.
    Restored,
    /// The transaction awaits an external action.
    Deferred,
    /// Unknown state reported by the native layer.
    Unspecified,
}

/// Error attached to a legacy queue transaction or restore failure.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct NativeTransactionError {
    /// `NSError` code.
    pub code: i64,
    /// `NSError` domain.
    pub domain: String,
    /// Localized description.
    pub description: String,
}

impl From<NativeTransactionError> for StoreKitError {
    fn from(error: NativeTransactionError) -> Self {
        Self::Platform {
            code: error.code.to_string(),
            message: error.description,
            details: Some(error.domain),
        }
    }
}

impl From<&NativeTransactionError> for PlatformError {
    fn from(error: &NativeTransactionError) -> Self {
        Self::new(
            error.code.to_string(),
            error.description.clone(),
            Some(error.domain.clone()),
        )
    }
}

/// A transaction delivered by the legacy payment queue.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct NativeTransaction {
    /// Transaction identifier, absent while purchasing.
    pub transaction_identifier: Option<String>,
    /// Identifier of the original transaction for restores.
    pub original_transaction_identifier: Option<String>,
    /// Product identifier of the payment.
    pub product_identifier: String,
    /// Current state.
    pub state: TransactionState,
    /// Transaction time in seconds since the epoch.
    pub transaction_timestamp: Option<f64>,
    /// Failure reason when `state` is `Failed`.
    pub error: Option<NativeTransactionError>,
}

/// A transaction delivered by the StoreKit 2 `Transaction.updates` listener.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct Sk2Transaction {
    /// Numeric transaction identifier.
    pub id: u64,
    /// Numeric identifier of the original purchase.
    pub original_id: u64,
    /// Product identifier.
    pub product_id: String,
    /// Purchase time in seconds since the epoch.
    pub purchase_date: Option<f64>,
    /// Account token supplied at purchase time.
    pub app_account_token: Option<String>,
    /// JWS representation used for server-side verification.
    pub jws_representation: Option<String>,
    /// Whether the transaction was delivered by a restore.
    pub restoring: bool,
}
