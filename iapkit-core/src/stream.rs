//! Fan-out stream of purchase updates.
//!
//! Native transaction listening is tied to the number of live subscriptions:
//! the first subscription starts it, dropping the last one stops it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::details::PurchaseDetails;

type Hook = Box<dyn Fn() + Send + Sync>;
type Batch = Vec<PurchaseDetails>;

/// Callbacks run when the stream gains its first or loses its last listener.
pub(crate) struct ListenHooks {
    pub on_listen: Hook,
    pub on_cancel: Hook,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    senders: Vec<(u64, mpsc::UnboundedSender<Batch>)>,
}

/// Lossless fan-out of purchase update batches. Every subscription gets its
/// own queue, so a slow listener never loses a batch.
pub(crate) struct PurchaseUpdates {
    subscribers: Mutex<Subscribers>,
    hooks: ListenHooks,
}

impl PurchaseUpdates {
    pub(crate) fn new(hooks: ListenHooks) -> Arc<Self> {
        Arc::new(Self {
            subscribers: Mutex::new(Subscribers::default()),
            hooks,
        })
    }

    fn subscribers(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes one batch to every live subscription, in call order.
    pub(crate) fn publish(&self, batch: Batch) {
        let mut subscribers = self.subscribers();
        if subscribers.senders.is_empty() {
            log::debug!("dropped update batch of {} purchases: no listeners", batch.len());
            return;
        }
        subscribers
            .senders
            .retain(|(_, sender)| sender.send(batch.clone()).is_ok());
    }

    pub(crate) fn subscribe(self: &Arc<Self>) -> PurchaseSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut subscribers = self.subscribers();
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.senders.push((id, sender));
        if subscribers.senders.len() == 1 {
            log::debug!("first purchase listener attached");
            (self.hooks.on_listen)();
        }
        PurchaseSubscription {
            id,
            receiver: tokio::sync::Mutex::new(receiver),
            updates: Arc::clone(self),
        }
    }

    fn release(&self, id: u64) {
        let mut subscribers = self.subscribers();
        let before = subscribers.senders.len();
        subscribers.senders.retain(|(sender_id, _)| *sender_id != id);
        if before > 0 && subscribers.senders.is_empty() {
            log::debug!("last purchase listener detached");
            (self.hooks.on_cancel)();
        }
    }
}

/// A live subscription to purchase updates. Dropping it detaches the listener.
#[derive(uniffi::Object)]
pub struct PurchaseSubscription {
    id: u64,
    receiver: tokio::sync::Mutex<mpsc::UnboundedReceiver<Batch>>,
    updates: Arc<PurchaseUpdates>,
}

impl std::fmt::Debug for PurchaseSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurchaseSubscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[uniffi::export]
impl PurchaseSubscription {
    /// Waits for the next batch of purchase updates.
    ///
    /// Batches queue up until read; none are skipped. Returns `None` if the
    /// stream is closed.
    pub async fn next_update(&self) -> Option<Vec<PurchaseDetails>> {
        self.receiver.lock().await.recv().await
    }
}

impl Drop for PurchaseSubscription {
    fn drop(&mut self) {
        self.updates.release(self.id);
    }
}
