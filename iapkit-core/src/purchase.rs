//! Purchase initiation against the StoreKit 2 and legacy queue APIs.

use crate::error::{PlatformError, StoreKitError};
use crate::native::{
    NativePurchaseResult, PaymentQueue, PaymentRequest, PurchaseOptions, StoreApi,
};
use crate::offer::convert_promotional_offer;
use crate::types::{PurchaseParam, PurchaseResponse, PurchaseResult};

impl From<NativePurchaseResult> for PurchaseResult {
    fn from(result: NativePurchaseResult) -> Self {
        match result {
            NativePurchaseResult::Success => Self::Ok,
            NativePurchaseResult::Unverified => Self::Unverified,
            NativePurchaseResult::UserCancelled => Self::UserCanceled,
            NativePurchaseResult::Pending => Self::Pending,
        }
    }
}

/// Builds the native purchase options for a request.
///
/// Only StoreKit 2 parameters carry offers; the other variants fall back to
/// their quantity (1 for generic requests) and account token.
#[must_use]
pub fn purchase_options(param: &PurchaseParam) -> PurchaseOptions {
    match param {
        PurchaseParam::StoreKit2 {
            application_user_name,
            quantity,
            win_back_offer_id,
            promotional_offer,
            ..
        } => PurchaseOptions {
            quantity: *quantity,
            app_account_token: application_user_name.clone(),
            win_back_offer_id: win_back_offer_id.clone(),
            promotional_offer: convert_promotional_offer(promotional_offer.as_ref()),
        },
        PurchaseParam::AppStore {
            application_user_name,
            quantity,
            ..
        } => PurchaseOptions {
            quantity: *quantity,
            app_account_token: application_user_name.clone(),
            ..PurchaseOptions::default()
        },
        PurchaseParam::Generic {
            application_user_name,
            ..
        } => PurchaseOptions {
            app_account_token: application_user_name.clone(),
            ..PurchaseOptions::default()
        },
    }
}

/// Builds the legacy queue payment for a request.
#[must_use]
pub fn payment_request(param: &PurchaseParam) -> PaymentRequest {
    let (quantity, simulates_ask_to_buy, payment_discount) = match param {
        PurchaseParam::AppStore {
            quantity,
            simulates_ask_to_buy,
            discount,
            ..
        } => (*quantity, *simulates_ask_to_buy, discount.clone()),
        PurchaseParam::StoreKit2 { quantity, .. } => (*quantity, false, None),
        PurchaseParam::Generic { .. } => (1, false, None),
    };
    PaymentRequest {
        product_identifier: param.product().id.clone(),
        application_username: param.application_user_name().map(str::to_string),
        quantity,
        simulates_ask_to_buy,
        payment_discount,
    }
}

fn failed(error: &StoreKitError, context: String) -> PurchaseResponse {
    log::warn!("{context} failed: {error}");
    PurchaseResponse::Failed {
        error: PlatformError::from(error),
        context,
    }
}

/// Purchases through `Product.purchase`. Errors are returned inside the response.
pub(crate) async fn initiate_purchase(
    store: &dyn StoreApi,
    param: &PurchaseParam,
) -> PurchaseResponse {
    let product_id = param.product().id.clone();
    let options = purchase_options(param);
    log::debug!("purchasing {product_id} with quantity {}", options.quantity);

    match store.purchase(product_id.clone(), options).await {
        Ok(result) => {
            let result = PurchaseResult::from(result);
            log::info!("purchase of {product_id} finished: {result}");
            PurchaseResponse::Completed { result }
        }
        Err(error) => failed(&error, format!("purchase of {product_id}")),
    }
}

/// Submits a payment to the legacy queue. A queued payment reports `Pending`;
/// its outcome is delivered to the transaction observer.
pub(crate) async fn submit_payment(
    queue: &dyn PaymentQueue,
    param: &PurchaseParam,
) -> PurchaseResponse {
    let request = payment_request(param);
    let product_id = request.product_identifier.clone();

    match queue.add_payment(request).await {
        Ok(()) => {
            log::debug!("payment for {product_id} queued");
            PurchaseResponse::Completed {
                result: PurchaseResult::Pending,
            }
        }
        Err(error) => failed(&error, format!("payment for {product_id}")),
    }
}
