//! Translation of offer parameters into native purchase messages.

use crate::native::PromotionalOfferPurchaseMessage;
use crate::types::PromotionalOffer;

/// Converts an optional promotional offer into the message attached to a
/// native purchase. Absence maps to absence; fields are copied verbatim.
#[must_use]
pub fn convert_promotional_offer(
    offer: Option<&PromotionalOffer>,
) -> Option<PromotionalOfferPurchaseMessage> {
    offer.map(|offer| PromotionalOfferPurchaseMessage {
        key_id: offer.signature.key_id.clone(),
        nonce: offer.signature.nonce.clone(),
        signature: offer.signature.signature.clone(),
        timestamp: offer.signature.timestamp,
        promotional_offer_id: offer.offer_id.clone(),
    })
}
