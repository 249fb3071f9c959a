//! The StoreKit purchase platform exposed to the application.

use std::sync::Arc;

use crate::config::{PlatformConfig, StoreKitVersion};
use crate::details::PurchaseDetails;
use crate::error::{StoreKitError, StoreKitResult};
use crate::native::{
    PaymentQueue, PaymentQueueDelegate, Sk2Transaction, StoreApi, StoreKitProvider,
    StorefrontApi,
};
use crate::observer::{RestoreState, TransactionObserver};
use crate::products::{query_products, ProductQueryResult};
use crate::purchase::{initiate_purchase, submit_payment};
use crate::stream::{ListenHooks, PurchaseSubscription, PurchaseUpdates};
use crate::types::{PurchaseParam, PurchaseResponse};

/// Entry point implementing the cross-platform purchase contract on top of StoreKit.
///
/// Owns the payment queue observer and the purchase update stream. Native
/// transaction listening runs only while at least one [`PurchaseSubscription`]
/// is alive.
#[derive(uniffi::Object)]
pub struct StoreKitPlatform {
    config: PlatformConfig,
    store: Arc<dyn StoreApi>,
    storefront: Arc<dyn StorefrontApi>,
    payment_queue: Arc<dyn PaymentQueue>,
    observer: Arc<TransactionObserver>,
    updates: Arc<PurchaseUpdates>,
}

impl std::fmt::Debug for StoreKitPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreKitPlatform")
            .field("config", &self.config)
            .field("observer", &self.observer)
            .finish_non_exhaustive()
    }
}

fn listen_hooks(
    version: StoreKitVersion,
    store: &Arc<dyn StoreApi>,
    payment_queue: &Arc<dyn PaymentQueue>,
) -> ListenHooks {
    match version {
        StoreKitVersion::V1 => {
            let (start, stop) = (Arc::clone(payment_queue), Arc::clone(payment_queue));
            ListenHooks {
                on_listen: Box::new(move || start.start_observing_transaction_queue()),
                on_cancel: Box::new(move || stop.stop_observing_transaction_queue()),
            }
        }
        StoreKitVersion::V2 => {
            let (start, stop) = (Arc::clone(store), Arc::clone(store));
            ListenHooks {
                on_listen: Box::new(move || start.start_listening_transactions()),
                on_cancel: Box::new(move || stop.stop_listening_transactions()),
            }
        }
    }
}

#[uniffi::export]
impl StoreKitPlatform {
    /// Builds the platform from the native components and installs the
    /// payment queue observer.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(provider: Arc<dyn StoreKitProvider>, config: PlatformConfig) -> Arc<Self> {
        let store = provider.store();
        let payment_queue = provider.payment_queue();
        let updates =
            PurchaseUpdates::new(listen_hooks(config.storekit_version, &store, &payment_queue));
        let observer = Arc::new(TransactionObserver::new(
            Arc::clone(&payment_queue),
            provider.receipts(),
            Arc::clone(&updates),
        ));
        payment_queue.set_transaction_observer(
            Arc::clone(&observer) as Arc<dyn PaymentQueueDelegate>
        );
        log::info!(
            "storekit platform created (storekit {})",
            config.storekit_version
        );

        Arc::new(Self {
            config,
            store,
            storefront: provider.storefront(),
            payment_queue,
            observer,
            updates,
        })
    }

    /// Whether the device can make payments.
    pub async fn is_available(&self) -> bool {
        match self.config.storekit_version {
            StoreKitVersion::V1 => self.payment_queue.can_make_payments().await,
            StoreKitVersion::V2 => self.store.is_available().await,
        }
    }

    /// Buys a non-consumable product or subscription.
    ///
    /// Initiation failures are reported as [`PurchaseResponse::Failed`].
    pub async fn buy_non_consumable(&self, param: PurchaseParam) -> PurchaseResponse {
        match self.config.storekit_version {
            StoreKitVersion::V1 => submit_payment(self.payment_queue.as_ref(), &param).await,
            StoreKitVersion::V2 => initiate_purchase(self.store.as_ref(), &param).await,
        }
    }

    /// Buys a consumable product. StoreKit always consumes automatically, so
    /// `auto_consume` must be `true`.
    ///
    /// # Errors
    /// Returns [`StoreKitError::InvalidInput`] if `auto_consume` is `false`.
    pub async fn buy_consumable(
        &self,
        param: PurchaseParam,
        auto_consume: bool,
    ) -> StoreKitResult<PurchaseResponse> {
        if !auto_consume {
            return Err(StoreKitError::invalid_input(
                "auto_consume",
                "consumables are always consumed automatically on this platform",
            ));
        }
        Ok(self.buy_non_consumable(param).await)
    }

    /// Finishes the native transaction behind `details`.
    ///
    /// # Errors
    /// Returns [`StoreKitError::InvalidInput`] if the purchase id is missing
    /// or, with StoreKit 2, not numeric. Native failures are passed through.
    pub async fn complete_purchase(&self, details: PurchaseDetails) -> StoreKitResult<()> {
        match self.config.storekit_version {
            StoreKitVersion::V1 => {
                self.payment_queue
                    .finish_transaction(details.purchase_id, details.product_id)
                    .await
            }
            StoreKitVersion::V2 => {
                let purchase_id = details.purchase_id.ok_or_else(|| {
                    StoreKitError::invalid_input("purchase_id", "missing transaction id")
                })?;
                let transaction_id = purchase_id.parse::<u64>().map_err(|_| {
                    StoreKitError::invalid_input(
                        "purchase_id",
                        format!("`{purchase_id}` is not a numeric transaction id"),
                    )
                })?;
                self.store.finish(transaction_id).await
            }
        }
    }

    /// Restores previous purchases. They are delivered on the update stream.
    ///
    /// With the legacy queue this resolves once the queue reports the end of
    /// the restore; a restore that found nothing publishes an empty batch.
    ///
    /// # Errors
    /// - [`StoreKitError::RestoreInProgress`] if a legacy restore is pending.
    /// - The native error if the restore fails.
    pub async fn restore_purchases(
        &self,
        application_user_name: Option<String>,
    ) -> StoreKitResult<()> {
        match self.config.storekit_version {
            StoreKitVersion::V1 => {
                self.observer
                    .restore_transactions(application_user_name)
                    .await
            }
            StoreKitVersion::V2 => self.store.restore_purchases().await,
        }
    }

    /// Looks up products. Never fails; see [`ProductQueryResult`].
    pub async fn query_product_details(&self, identifiers: Vec<String>) -> ProductQueryResult {
        query_products(self.store.as_ref(), identifiers).await
    }

    /// ISO 3166-1 alpha-3 code of the current storefront.
    ///
    /// # Errors
    /// Returns the native error if the storefront is unavailable.
    pub async fn country_code(&self) -> StoreKitResult<String> {
        self.storefront.country_code().await
    }

    /// Whether the account can redeem the product's introductory offer.
    ///
    /// # Errors
    /// Returns [`StoreKitError::Eligibility`] when the check cannot be answered;
    /// an ineligible account yields `Ok(false)`.
    pub async fn is_introductory_offer_eligible(&self, product_id: String) -> StoreKitResult<bool> {
        self.storefront
            .is_intro_offer_eligible(product_id)
            .await
            .map_err(StoreKitError::into_eligibility)
    }

    /// Whether the account can redeem the given win-back offer.
    ///
    /// # Errors
    /// Returns [`StoreKitError::Eligibility`] when the check cannot be answered;
    /// an ineligible account yields `Ok(false)`.
    pub async fn is_win_back_offer_eligible(
        &self,
        product_id: String,
        offer_id: String,
    ) -> StoreKitResult<bool> {
        self.storefront
            .is_win_back_offer_eligible(product_id, offer_id)
            .await
            .map_err(StoreKitError::into_eligibility)
    }

    /// Subscribes to purchase updates.
    #[must_use]
    pub fn purchase_updates(&self) -> Arc<PurchaseSubscription> {
        Arc::new(self.updates.subscribe())
    }

    /// Entry point for the native StoreKit 2 transaction listener.
    pub fn transactions_updated(&self, transactions: Vec<Sk2Transaction>) {
        let batch = transactions
            .into_iter()
            .map(PurchaseDetails::from_sk2_transaction)
            .collect();
        self.updates.publish(batch);
    }

    /// Current state of the legacy restore session.
    #[must_use]
    pub fn restore_state(&self) -> RestoreState {
        self.observer.restore_state()
    }

    /// The payment queue observer installed on the native queue.
    #[must_use]
    pub fn transaction_observer(&self) -> Arc<dyn PaymentQueueDelegate> {
        Arc::clone(&self.observer) as Arc<dyn PaymentQueueDelegate>
    }
}
