//! Native StoreKit boundary: the foreign traits the host app implements and the
//! records that cross them.

pub mod traits;
pub mod types;

pub use traits::{
    PaymentQueue, PaymentQueueDelegate, ReceiptApi, StoreApi, StoreKitProvider,
    StorefrontApi,
};
pub use types::{
    NativeProduct, NativePurchaseResult, NativeTransaction, NativeTransactionError,
    PaymentDiscount, PaymentRequest, PromotionalOfferPurchaseMessage, PurchaseOptions,
    Sk2Transaction, TransactionState,
};
