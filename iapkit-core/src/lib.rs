#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
//! StoreKit adapter for cross-platform in-app purchases.
//!
//! [`StoreKitPlatform`] translates generic purchase requests into StoreKit 1
//! (payment queue) or StoreKit 2 (`Product`/`Transaction`) calls and
//! republishes native transaction events as a single stream of
//! [`PurchaseDetails`] batches. Every native collaborator is a foreign trait in
//! [`native`], implemented by the host app.

mod config;
pub use config::*;

mod details;
pub use details::*;

mod error;
pub use error::*;

pub mod logger;

pub mod native;

mod observer;
pub use observer::*;

mod offer;
pub use offer::*;

mod platform;
pub use platform::*;

mod products;
pub use products::*;

mod purchase;
pub use purchase::*;

mod registry;
pub use registry::*;

mod stream;
pub use stream::PurchaseSubscription;

mod types;
pub use types::*;

uniffi::setup_scaffolding!("iapkit_core");
