//! Adapter configuration.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{StoreKitError, StoreKitResult};

/// Which native StoreKit API services purchases.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    EnumString,
    Display,
    Serialize,
    Deserialize,
    uniffi::Enum,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StoreKitVersion {
    /// The legacy payment queue (`SKPaymentQueue`).
    V1,
    /// The `Product`/`Transaction` API.
    #[default]
    V2,
}

/// Configuration for a [`crate::StoreKitPlatform`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformConfig {
    /// Native API used for purchase, completion and restore.
    pub storekit_version: StoreKitVersion,
}

impl PlatformConfig {
    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`StoreKitError::InvalidInput`] if the JSON is malformed or
    /// names an unknown field.
    pub fn from_json(json: &str) -> StoreKitResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| StoreKitError::invalid_input("config", e.to_string()))
    }
}

/// Parses a [`PlatformConfig`] from JSON.
///
/// # Errors
/// See [`PlatformConfig::from_json`].
#[uniffi::export]
pub fn platform_config_from_json(json: &str) -> StoreKitResult<PlatformConfig> {
    PlatformConfig::from_json(json)
}
