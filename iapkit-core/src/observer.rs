//! Legacy payment queue observer and restore-session tracking.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::{prelude::BASE64_STANDARD, Engine};
use tokio::sync::oneshot;

use crate::details::PurchaseDetails;
use crate::error::{StoreKitError, StoreKitResult};
use crate::native::{
    NativeProduct, NativeTransaction, NativeTransactionError, PaymentQueue,
    PaymentQueueDelegate, PaymentRequest, ReceiptApi, TransactionState,
};
use crate::stream::PurchaseUpdates;

/// Progress of the current restore session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, uniffi::Enum)]
pub enum RestoreState {
    /// No restore in flight.
    #[default]
    NotRunning,
    /// Restore requested, no restored transaction seen yet.
    WaitingForTransactions,
    /// At least one restored transaction was delivered.
    ReceivedTransaction,
}

#[derive(Default)]
struct RestoreSession {
    state: RestoreState,
    completer: Option<oneshot::Sender<StoreKitResult<()>>>,
}

impl RestoreSession {
    /// Ends the session, returning the state it ended in and its completer.
    fn finish(&mut self) -> (RestoreState, Option<oneshot::Sender<StoreKitResult<()>>>) {
        (std::mem::take(&mut self.state), self.completer.take())
    }
}

/// Receives payment queue callbacks and republishes them as purchase updates.
pub struct TransactionObserver {
    payment_queue: Arc<dyn PaymentQueue>,
    receipts: Arc<dyn ReceiptApi>,
    updates: Arc<PurchaseUpdates>,
    session: Mutex<RestoreSession>,
    // serializes publication so batches leave in delivery order
    publish: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for TransactionObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionObserver")
            .field("restore_state", &self.restore_state())
            .finish_non_exhaustive()
    }
}

impl TransactionObserver {
    pub(crate) fn new(
        payment_queue: Arc<dyn PaymentQueue>,
        receipts: Arc<dyn ReceiptApi>,
        updates: Arc<PurchaseUpdates>,
    ) -> Self {
        Self {
            payment_queue,
            receipts,
            updates,
            session: Mutex::new(RestoreSession::default()),
            publish: tokio::sync::Mutex::new(()),
        }
    }

    fn session(&self) -> MutexGuard<'_, RestoreSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current restore-session state.
    #[must_use]
    pub fn restore_state(&self) -> RestoreState {
        self.session().state
    }

    /// Restores completed transactions and waits for the queue to report the
    /// end of the session.
    ///
    /// # Errors
    /// - [`StoreKitError::RestoreInProgress`] if another restore is pending.
    /// - The native error if the restore could not be issued or failed.
    /// - [`StoreKitError::RestoreInterrupted`] if the observer went away first.
    pub(crate) async fn restore_transactions(
        &self,
        application_user_name: Option<String>,
    ) -> StoreKitResult<()> {
        let completion = {
            let mut session = self.session();
            if session.state != RestoreState::NotRunning || session.completer.is_some() {
                return Err(StoreKitError::RestoreInProgress);
            }
            let (sender, receiver) = oneshot::channel();
            session.completer = Some(sender);
            session.state = RestoreState::WaitingForTransactions;
            receiver
        };
        log::info!("restore session started");

        if let Err(error) = self
            .payment_queue
            .restore_transactions(application_user_name)
            .await
        {
            log::warn!("restore request failed: {error}");
            let _ = self.session().finish();
            return Err(error);
        }

        completion
            .await
            .map_err(|_| StoreKitError::RestoreInterrupted)?
    }

    async fn receipt_data(&self) -> String {
        match self.receipts.retrieve_receipt_data().await {
            Ok(bytes) => BASE64_STANDARD.encode(bytes),
            Err(error) => {
                log::warn!("receipt unavailable, publishing without it: {error}");
                String::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl PaymentQueueDelegate for TransactionObserver {
    async fn updated_transactions(&self, transactions: Vec<NativeTransaction>) {
        {
            let mut session = self.session();
            if session.state == RestoreState::WaitingForTransactions
                && transactions
                    .iter()
                    .any(|transaction| transaction.state == TransactionState::Restored)
            {
                log::debug!("restore session received its first restored transaction");
                session.state = RestoreState::ReceivedTransaction;
            }
        }

        let _publish = self.publish.lock().await;
        let receipt = self.receipt_data().await;
        let batch = transactions
            .into_iter()
            .map(|transaction| PurchaseDetails::from_transaction(transaction, &receipt))
            .collect();
        self.updates.publish(batch);
    }

    fn removed_transactions(&self, transactions: Vec<NativeTransaction>) {
        log::debug!("{} transactions removed from the queue", transactions.len());
    }

    async fn restore_completed_transactions_failed(&self, error: NativeTransactionError) {
        let _publish = self.publish.lock().await;
        let (_, completer) = self.session().finish();
        log::warn!("restore session failed: {}", error.description);
        match completer {
            Some(completer) => {
                let _ = completer.send(Err(StoreKitError::from(error)));
            }
            None => log::warn!("restore failure reported without a pending restore"),
        }
    }

    async fn payment_queue_restore_completed_transactions_finished(&self) {
        let _publish = self.publish.lock().await;
        let (state, completer) = self.session().finish();
        log::info!("restore session finished in state {state:?}");
        match completer {
            Some(completer) => {
                let _ = completer.send(Ok(()));
            }
            None => log::warn!("restore completion reported without a pending restore"),
        }
        if state == RestoreState::WaitingForTransactions {
            // nothing was restored; tell listeners explicitly
            self.updates.publish(Vec::new());
        }
    }

    fn should_add_store_payment(&self, payment: PaymentRequest, _product: NativeProduct) -> bool {
        log::debug!(
            "accepting store-initiated payment for {}",
            payment.product_identifier
        );
        true
    }
}
