//! Platform interfaces implemented by the native StoreKit bridge.

use std::sync::Arc;

use super::types::{
    NativeProduct, NativePurchaseResult, NativeTransaction, NativeTransactionError,
    PaymentRequest, PurchaseOptions,
};
use crate::error::StoreKitResult;

/// StoreKit 2 product and transaction API.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait StoreApi: Send + Sync {
    /// Whether the device can make payments.
    async fn is_available(&self) -> bool;

    /// Looks up products by identifier. Unknown identifiers are omitted from the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog request fails.
    async fn products(&self, identifiers: Vec<String>) -> StoreKitResult<Vec<NativeProduct>>;

    /// Purchases a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the purchase could not be started or failed.
    async fn purchase(
        &self,
        product_id: String,
        options: PurchaseOptions,
    ) -> StoreKitResult<NativePurchaseResult>;

    /// Finishes the transaction with the given numeric id.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be found or finished.
    async fn finish(&self, transaction_id: u64) -> StoreKitResult<()>;

    /// Re-delivers current entitlements through the transaction listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync with the App Store fails.
    async fn restore_purchases(&self) -> StoreKitResult<()>;

    /// Starts forwarding `Transaction.updates` to the platform.
    fn start_listening_transactions(&self);

    /// Stops forwarding `Transaction.updates`.
    fn stop_listening_transactions(&self);
}

/// Storefront and offer eligibility API.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait StorefrontApi: Send + Sync {
    /// ISO 3166-1 alpha-3 code of the current storefront.
    ///
    /// # Errors
    ///
    /// Returns an error if the storefront is unavailable.
    async fn country_code(&self) -> StoreKitResult<String>;

    /// Whether the account is eligible for the product's introductory offer.
    ///
    /// # Errors
    ///
    /// Returns an error carrying one of the `storekit2_*` codes when the check
    /// cannot be answered.
    async fn is_intro_offer_eligible(&self, product_id: String) -> StoreKitResult<bool>;

    /// Whether the account is eligible for the given win-back offer.
    ///
    /// # Errors
    ///
    /// Returns an error carrying one of the `storekit2_*` codes when the check
    /// cannot be answered.
    async fn is_win_back_offer_eligible(
        &self,
        product_id: String,
        offer_id: String,
    ) -> StoreKitResult<bool>;
}

/// Legacy payment queue (`SKPaymentQueue`).
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait PaymentQueue: Send + Sync {
    /// Whether the user is allowed to make payments.
    async fn can_make_payments(&self) -> bool;

    /// Adds a payment to the queue. The outcome arrives through the observer.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment is rejected before being queued.
    async fn add_payment(&self, request: PaymentRequest) -> StoreKitResult<()>;

    /// Finishes a queued transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if no matching transaction is in the queue.
    async fn finish_transaction(
        &self,
        transaction_id: Option<String>,
        product_id: String,
    ) -> StoreKitResult<()>;

    /// Asks the queue to restore completed transactions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be issued.
    async fn restore_transactions(
        &self,
        application_user_name: Option<String>,
    ) -> StoreKitResult<()>;

    /// Installs the observer that receives queue callbacks.
    fn set_transaction_observer(&self, observer: Arc<dyn PaymentQueueDelegate>);

    /// Starts delivering queue callbacks to the observer.
    fn start_observing_transaction_queue(&self);

    /// Stops delivering queue callbacks to the observer.
    fn stop_observing_transaction_queue(&self);
}

/// App receipt access.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait ReceiptApi: Send + Sync {
    /// Reads the raw app receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt is missing or unreadable.
    async fn retrieve_receipt_data(&self) -> StoreKitResult<Vec<u8>>;
}

/// Provider responsible for the native StoreKit components.
#[uniffi::export(with_foreign)]
pub trait StoreKitProvider: Send + Sync {
    /// Returns the StoreKit 2 API.
    fn store(&self) -> Arc<dyn StoreApi>;

    /// Returns the storefront and eligibility API.
    fn storefront(&self) -> Arc<dyn StorefrontApi>;

    /// Returns the legacy payment queue.
    fn payment_queue(&self) -> Arc<dyn PaymentQueue>;

    /// Returns the receipt API.
    fn receipts(&self) -> Arc<dyn ReceiptApi>;
}

/// Callbacks the native payment queue delivers (`SKPaymentTransactionObserver`).
#[uniffi::export]
#[async_trait::async_trait]
pub trait PaymentQueueDelegate: Send + Sync {
    /// A batch of transactions changed state.
    async fn updated_transactions(&self, transactions: Vec<NativeTransaction>);

    /// Transactions were removed from the queue.
    fn removed_transactions(&self, transactions: Vec<NativeTransaction>);

    /// A restore request failed.
    async fn restore_completed_transactions_failed(&self, error: NativeTransactionError);

    /// A restore request delivered all its transactions.
    async fn payment_queue_restore_completed_transactions_finished(&self);

    /// A purchase was started from the App Store; returns whether to continue it.
    fn should_add_store_payment(&self, payment: PaymentRequest, product: NativeProduct) -> bool;
}
