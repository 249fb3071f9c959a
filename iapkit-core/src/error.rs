//! Error types surfaced by the StoreKit adapter.

use strum::{Display, EnumString};
use thiserror::Error;

/// Source tag carried by every structured error payload.
pub const ERROR_SOURCE: &str = "app_store";

/// Result type for adapter operations.
pub type StoreKitResult<T> = Result<T, StoreKitError>;

/// Errors raised by the adapter or reported by the native StoreKit layer.
#[derive(Debug, Error, uniffi::Error)]
pub enum StoreKitError {
    /// A native StoreKit call failed.
    #[error("{code}: {message}")]
    Platform {
        /// Native error code.
        code: String,
        /// Human readable description.
        message: String,
        /// Extra native context, such as the error domain.
        details: Option<String>,
    },
    /// An offer eligibility check could not be answered.
    #[error("eligibility_check_failed ({failure}): {message}")]
    Eligibility {
        /// The reason the check could not be completed.
        failure: EligibilityFailure,
        /// Human readable description.
        message: String,
    },
    /// A restore session is already waiting on the payment queue.
    #[error("restore_in_progress")]
    RestoreInProgress,
    /// The restore session ended without a native completion callback.
    #[error("restore_interrupted")]
    RestoreInterrupted,
    /// The presented input is not valid for the requested operation.
    #[error("invalid_input_{attribute}: {reason}")]
    InvalidInput {
        /// Name of the offending attribute.
        attribute: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl StoreKitError {
    pub(crate) fn invalid_input(attribute: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            attribute: attribute.to_string(),
            reason: reason.into(),
        }
    }

    /// Reclassifies a native failure from an eligibility API into an
    /// [`StoreKitError::Eligibility`] error.
    ///
    /// Native codes that are not recognised are reported as
    /// [`EligibilityFailure::CheckFailed`].
    #[must_use]
    pub fn into_eligibility(self) -> Self {
        match self {
            Self::Platform { code, message, .. } => Self::Eligibility {
                failure: code.parse().unwrap_or(EligibilityFailure::CheckFailed),
                message,
            },
            Self::UnexpectedUniFFICallbackError(message) => Self::Eligibility {
                failure: EligibilityFailure::CheckFailed,
                message,
            },
            other => other,
        }
    }

    /// Stable code identifying this error in the structured payload.
    #[must_use]
    pub fn code(&self) -> String {
        match self {
            Self::Platform { code, .. } => code.clone(),
            Self::Eligibility { failure, .. } => failure.to_string(),
            Self::RestoreInProgress => "restore_in_progress".to_string(),
            Self::RestoreInterrupted => "restore_interrupted".to_string(),
            Self::InvalidInput { .. } => "invalid_input".to_string(),
            Self::UnexpectedUniFFICallbackError(_) => {
                "unexpected_callback_error".to_string()
            }
        }
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for StoreKitError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}

/// Why an introductory or win-back offer eligibility check failed.
///
/// These are distinct from a negative answer: an account that is simply not
/// eligible yields `Ok(false)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, uniffi::Enum)]
pub enum EligibilityFailure {
    /// The StoreKit 2 feature is not enabled in the native layer.
    #[strum(serialize = "storekit2_not_enabled")]
    FeatureDisabled,
    /// The product could not be fetched from the catalog.
    #[strum(serialize = "storekit2_failed_to_fetch_product")]
    ProductNotFound,
    /// The product is not an auto-renewable subscription.
    #[strum(serialize = "storekit2_not_subscription")]
    NotSubscription,
    /// The native check itself failed.
    #[strum(serialize = "storekit2_eligibility_check_failed")]
    CheckFailed,
    /// The running OS does not support the check.
    #[strum(serialize = "storekit2_unsupported_platform_version")]
    UnsupportedPlatformVersion,
}

/// Structured error payload handed to the application.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct PlatformError {
    /// Always [`ERROR_SOURCE`].
    pub source: String,
    /// Error code.
    pub code: String,
    /// Human readable description.
    pub message: String,
    /// Optional extra context.
    pub details: Option<String>,
}

impl PlatformError {
    /// Creates a payload tagged with [`ERROR_SOURCE`].
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            source: ERROR_SOURCE.to_string(),
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<&StoreKitError> for PlatformError {
    fn from(error: &StoreKitError) -> Self {
        let details = match error {
            StoreKitError::Platform { details, .. } => details.clone(),
            _ => None,
        };
        let message = match error {
            StoreKitError::Platform { message, .. }
            | StoreKitError::Eligibility { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self::new(error.code(), message, details)
    }
}
