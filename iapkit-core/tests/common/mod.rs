//! In-memory StoreKit components shared across integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use iapkit_core::native::{
    NativeProduct, NativePurchaseResult, NativeTransaction, NativeTransactionError,
    PaymentQueue, PaymentQueueDelegate, PaymentRequest, PurchaseOptions, ReceiptApi,
    StoreApi, StoreKitProvider, StorefrontApi, TransactionState,
};
use iapkit_core::{
    PlatformConfig, ProductDetails, ProductType, PurchaseDetails, PurchaseSubscription,
    StoreKitError, StoreKitPlatform, StoreKitResult, StoreKitVersion,
};

pub fn native_product(id: &str) -> NativeProduct {
    NativeProduct {
        id: id.to_string(),
        display_name: format!("{id} title"),
        description: format!("{id} description"),
        display_price: "$4.99".to_string(),
        price: 4.99,
        currency_code: "USD".to_string(),
        currency_symbol: "$".to_string(),
        product_type: ProductType::NonConsumable,
    }
}

pub fn product(id: &str) -> ProductDetails {
    native_product(id).into()
}

pub fn transaction(id: &str, state: TransactionState) -> NativeTransaction {
    NativeTransaction {
        transaction_identifier: Some(id.to_string()),
        original_transaction_identifier: None,
        product_identifier: "gold".to_string(),
        state,
        transaction_timestamp: Some(1_700_000_000.0),
        error: None,
    }
}

pub fn platform_error(code: &str) -> StoreKitError {
    StoreKitError::Platform {
        code: code.to_string(),
        message: format!("{code} raised by fake"),
        details: None,
    }
}

/// Increments on every call, for hook/call counting.
#[derive(Default)]
pub struct Counter(AtomicUsize);

impl Counter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct FakeStore {
    pub catalog: Vec<NativeProduct>,
    pub available: bool,
    pub fail_products: bool,
    /// `None` makes `purchase` fail.
    pub purchase_outcome: Mutex<Option<NativePurchaseResult>>,
    pub purchases: Mutex<Vec<(String, PurchaseOptions)>>,
    pub finished: Mutex<Vec<u64>>,
    pub restores: Counter,
    pub listen_starts: Counter,
    pub listen_stops: Counter,
}

impl FakeStore {
    pub fn with_catalog(ids: &[&str]) -> Self {
        Self {
            catalog: ids.iter().map(|id| native_product(id)).collect(),
            available: true,
            fail_products: false,
            purchase_outcome: Mutex::new(Some(NativePurchaseResult::Success)),
            purchases: Mutex::new(Vec::new()),
            finished: Mutex::new(Vec::new()),
            restores: Counter::default(),
            listen_starts: Counter::default(),
            listen_stops: Counter::default(),
        }
    }
}

#[async_trait::async_trait]
impl StoreApi for FakeStore {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn products(&self, identifiers: Vec<String>) -> StoreKitResult<Vec<NativeProduct>> {
        if self.fail_products {
            return Err(platform_error("storekit_no_response"));
        }
        Ok(self
            .catalog
            .iter()
            .filter(|product| identifiers.contains(&product.id))
            .cloned()
            .collect())
    }

    async fn purchase(
        &self,
        product_id: String,
        options: PurchaseOptions,
    ) -> StoreKitResult<NativePurchaseResult> {
        self.purchases.lock().unwrap().push((product_id, options));
        let outcome = *self.purchase_outcome.lock().unwrap();
        outcome.ok_or_else(|| platform_error("purchase_failed"))
    }

    async fn finish(&self, transaction_id: u64) -> StoreKitResult<()> {
        self.finished.lock().unwrap().push(transaction_id);
        Ok(())
    }

    async fn restore_purchases(&self) -> StoreKitResult<()> {
        self.restores.hit();
        Ok(())
    }

    fn start_listening_transactions(&self) {
        self.listen_starts.hit();
    }

    fn stop_listening_transactions(&self) {
        self.listen_stops.hit();
    }
}

/// Answer the fake storefront gives to eligibility checks.
#[derive(Clone)]
pub enum Eligibility {
    Answer(bool),
    Fail(&'static str),
}

impl Eligibility {
    fn result(&self) -> StoreKitResult<bool> {
        match self {
            Self::Answer(answer) => Ok(*answer),
            Self::Fail(code) => Err(platform_error(code)),
        }
    }
}

pub struct FakeStorefront {
    pub country: String,
    pub eligibility: Mutex<Eligibility>,
    pub checks: Mutex<Vec<(String, Option<String>)>>,
}

impl Default for FakeStorefront {
    fn default() -> Self {
        Self {
            country: "USA".to_string(),
            eligibility: Mutex::new(Eligibility::Answer(true)),
            checks: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl StorefrontApi for FakeStorefront {
    async fn country_code(&self) -> StoreKitResult<String> {
        Ok(self.country.clone())
    }

    async fn is_intro_offer_eligible(&self, product_id: String) -> StoreKitResult<bool> {
        self.checks.lock().unwrap().push((product_id, None));
        self.eligibility.lock().unwrap().result()
    }

    async fn is_win_back_offer_eligible(
        &self,
        product_id: String,
        offer_id: String,
    ) -> StoreKitResult<bool> {
        self.checks.lock().unwrap().push((product_id, Some(offer_id)));
        self.eligibility.lock().unwrap().result()
    }
}

/// What the fake queue does when asked to restore.
pub enum RestoreScript {
    /// Deliver each batch to the observer, then report completion.
    Deliver(Vec<Vec<NativeTransaction>>),
    /// Report a restore failure to the observer.
    Fail(NativeTransactionError),
    /// Refuse to issue the restore.
    Reject,
    /// Accept the request and never call back.
    Hold,
}

pub struct FakePaymentQueue {
    observer: Mutex<Option<Arc<dyn PaymentQueueDelegate>>>,
    pub script: Mutex<RestoreScript>,
    pub payments: Mutex<Vec<PaymentRequest>>,
    pub finished: Mutex<Vec<(Option<String>, String)>>,
    pub restore_requests: Mutex<Vec<Option<String>>>,
    pub observe_starts: Counter,
    pub observe_stops: Counter,
}

impl Default for FakePaymentQueue {
    fn default() -> Self {
        Self {
            observer: Mutex::new(None),
            script: Mutex::new(RestoreScript::Deliver(Vec::new())),
            payments: Mutex::new(Vec::new()),
            finished: Mutex::new(Vec::new()),
            restore_requests: Mutex::new(Vec::new()),
            observe_starts: Counter::default(),
            observe_stops: Counter::default(),
        }
    }
}

impl FakePaymentQueue {
    pub fn observer(&self) -> Arc<dyn PaymentQueueDelegate> {
        self.observer
            .lock()
            .unwrap()
            .clone()
            .expect("observer installed")
    }

    pub fn has_observer(&self) -> bool {
        self.observer.lock().unwrap().is_some()
    }
}

#[async_trait::async_trait]
impl PaymentQueue for FakePaymentQueue {
    async fn can_make_payments(&self) -> bool {
        true
    }

    async fn add_payment(&self, request: PaymentRequest) -> StoreKitResult<()> {
        if request.quantity < 1 {
            return Err(platform_error("invalid_quantity"));
        }
        self.payments.lock().unwrap().push(request);
        Ok(())
    }

    async fn finish_transaction(
        &self,
        transaction_id: Option<String>,
        product_id: String,
    ) -> StoreKitResult<()> {
        self.finished.lock().unwrap().push((transaction_id, product_id));
        Ok(())
    }

    async fn restore_transactions(
        &self,
        application_user_name: Option<String>,
    ) -> StoreKitResult<()> {
        self.restore_requests
            .lock()
            .unwrap()
            .push(application_user_name);
        let script = std::mem::replace(&mut *self.script.lock().unwrap(), RestoreScript::Hold);
        let observer = self.observer();
        match script {
            RestoreScript::Deliver(batches) => {
                for batch in batches {
                    observer.updated_transactions(batch).await;
                }
                observer
                    .payment_queue_restore_completed_transactions_finished()
                    .await;
                Ok(())
            }
            RestoreScript::Fail(error) => {
                observer.restore_completed_transactions_failed(error).await;
                Ok(())
            }
            RestoreScript::Reject => Err(platform_error("restore_rejected")),
            RestoreScript::Hold => Ok(()),
        }
    }

    fn set_transaction_observer(&self, observer: Arc<dyn PaymentQueueDelegate>) {
        *self.observer.lock().unwrap() = Some(observer);
    }

    fn start_observing_transaction_queue(&self) {
        self.observe_starts.hit();
    }

    fn stop_observing_transaction_queue(&self) {
        self.observe_stops.hit();
    }
}

pub struct FakeReceipts {
    /// `None` makes retrieval fail.
    pub receipt: Mutex<Option<Vec<u8>>>,
}

impl Default for FakeReceipts {
    fn default() -> Self {
        Self {
            receipt: Mutex::new(Some(b"receipt".to_vec())),
        }
    }
}

#[async_trait::async_trait]
impl ReceiptApi for FakeReceipts {
    async fn retrieve_receipt_data(&self) -> StoreKitResult<Vec<u8>> {
        self.receipt
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| platform_error("receipt_missing"))
    }
}

/// Every fake behind one provider.
#[derive(Clone)]
pub struct Fakes {
    pub store: Arc<FakeStore>,
    pub storefront: Arc<FakeStorefront>,
    pub queue: Arc<FakePaymentQueue>,
    pub receipts: Arc<FakeReceipts>,
}

impl Fakes {
    pub fn new(store: FakeStore) -> Self {
        Self {
            store: Arc::new(store),
            storefront: Arc::new(FakeStorefront::default()),
            queue: Arc::new(FakePaymentQueue::default()),
            receipts: Arc::new(FakeReceipts::default()),
        }
    }

    pub fn platform(&self, version: StoreKitVersion) -> Arc<StoreKitPlatform> {
        let config = PlatformConfig {
            storekit_version: version,
        };
        StoreKitPlatform::new(Arc::new(self.clone()), config)
    }
}

impl StoreKitProvider for Fakes {
    fn store(&self) -> Arc<dyn StoreApi> {
        self.store.clone()
    }

    fn storefront(&self) -> Arc<dyn StorefrontApi> {
        self.storefront.clone()
    }

    fn payment_queue(&self) -> Arc<dyn PaymentQueue> {
        self.queue.clone()
    }

    fn receipts(&self) -> Arc<dyn ReceiptApi> {
        self.receipts.clone()
    }
}

/// Next batch on the stream, failing the test if none arrives quickly.
pub async fn next_batch(subscription: &PurchaseSubscription) -> Vec<PurchaseDetails> {
    tokio::time::timeout(Duration::from_secs(1), subscription.next_update())
        .await
        .expect("update batch published")
        .expect("stream open")
}

/// Asserts that nothing else is published.
pub async fn assert_no_batch(subscription: &PurchaseSubscription) {
    let next = tokio::time::timeout(Duration::from_millis(50), subscription.next_update()).await;
    assert!(next.is_err(), "unexpected batch: {next:?}");
}
