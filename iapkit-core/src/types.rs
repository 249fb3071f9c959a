//! Platform-neutral purchase data exchanged with the application.

use strum::Display;

use crate::error::PlatformError;
use crate::native::PaymentDiscount;

/// Kind of in-app product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum ProductType {
    /// Can be bought repeatedly.
    Consumable,
    /// Bought once and kept forever.
    NonConsumable,
    /// Auto-renewable subscription.
    AutoRenewable,
    /// Subscription that does not renew.
    NonRenewable,
}

/// A product as listed to the application.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct ProductDetails {
    /// Product identifier.
    pub id: String,
    /// Localized title.
    pub title: String,
    /// Localized description.
    pub description: String,
    /// Formatted price, including the currency sign.
    pub price: String,
    /// Unformatted price.
    pub raw_price: f64,
    /// ISO 4217 currency code.
    pub currency_code: String,
    /// Currency symbol.
    pub currency_symbol: String,
    /// Kind of product.
    pub product_type: ProductType,
}

/// Server-issued signature for a promotional offer.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct OfferSignature {
    /// Identifier of the subscription key used to sign.
    pub key_id: String,
    /// Single-use nonce (UUID).
    pub nonce: String,
    /// Signature creation time in milliseconds since the epoch.
    pub timestamp: i64,
    /// Base64 signature.
    pub signature: String,
}

/// A promotional offer the application wants to redeem.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PromotionalOffer {
    /// Offer identifier configured in App Store Connect.
    pub offer_id: String,
    /// Signature authorizing the redemption.
    pub signature: OfferSignature,
}

/// Parameters of a purchase request.
///
/// `Generic` is what a cross-platform caller sends; the other variants carry
/// options only one of the native APIs understands.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum PurchaseParam {
    /// Store-agnostic parameters.
    Generic {
        /// Product to buy.
        product: ProductDetails,
        /// Opaque user identifier.
        application_user_name: Option<String>,
    },
    /// Parameters for the legacy payment queue.
    AppStore {
        /// Product to buy.
        product: ProductDetails,
        /// Opaque user identifier.
        application_user_name: Option<String>,
        /// Number of units.
        quantity: i64,
        /// Whether the sandbox simulates Ask to Buy.
        simulates_ask_to_buy: bool,
        /// Signed discount to redeem.
        discount: Option<PaymentDiscount>,
    },
    /// Parameters for the StoreKit 2 purchase API.
    StoreKit2 {
        /// Product to buy.
        product: ProductDetails,
        /// Account token, sent as `appAccountToken`.
        application_user_name: Option<String>,
        /// Number of units.
        quantity: i64,
        /// Win-back offer to redeem.
        win_back_offer_id: Option<String>,
        /// Promotional offer to redeem.
        promotional_offer: Option<PromotionalOffer>,
    },
}

impl PurchaseParam {
    /// Product targeted by the purchase.
    #[must_use]
    pub const fn product(&self) -> &ProductDetails {
        match self {
            Self::Generic { product, .. }
            | Self::AppStore { product, .. }
            | Self::StoreKit2 { product, .. } => product,
        }
    }

    /// Opaque user identifier, if any.
    #[must_use]
    pub fn application_user_name(&self) -> Option<&str> {
        match self {
            Self::Generic {
                application_user_name,
                ..
            }
            | Self::AppStore {
                application_user_name,
                ..
            }
            | Self::StoreKit2 {
                application_user_name,
                ..
            } => application_user_name.as_deref(),
        }
    }
}

/// Result of a purchase that reached the native layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, uniffi::Enum)]
#[strum(serialize_all = "snake_case")]
pub enum PurchaseResult {
    /// Completed with a verified transaction.
    Ok,
    /// Completed, but the transaction failed verification.
    Unverified,
    /// The user cancelled.
    UserCanceled,
    /// Awaiting approval or queue processing; the outcome arrives on the update stream.
    Pending,
}

/// Response to a purchase request. Initiation failures never surface as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum PurchaseResponse {
    /// The native layer answered with a result.
    Completed {
        /// Mapped native result.
        result: PurchaseResult,
    },
    /// The purchase could not be initiated.
    Failed {
        /// Structured error.
        error: PlatformError,
        /// Description of the call that failed.
        context: String,
    },
}

impl PurchaseResponse {
    /// The mapped result, if the purchase reached the native layer.
    #[must_use]
    pub const fn result(&self) -> Option<PurchaseResult> {
        match self {
            Self::Completed { result } => Some(*result),
            Self::Failed { .. } => None,
        }
    }

    /// The initiation error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&PlatformError> {
        match self {
            Self::Completed { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }
}
