//! Holder for the process-wide default purchase platform.

use std::sync::{Arc, PoisonError, RwLock};

use crate::config::PlatformConfig;
use crate::native::StoreKitProvider;
use crate::platform::StoreKitPlatform;

/// Registry of the default [`StoreKitPlatform`].
///
/// Create one at startup and pass it to whatever needs the platform.
/// Registering again replaces the previous instance.
#[derive(Debug, Default, uniffi::Object)]
pub struct PlatformRegistry {
    instance: RwLock<Option<Arc<StoreKitPlatform>>>,
}

#[uniffi::export]
impl PlatformRegistry {
    /// Creates an empty registry.
    #[uniffi::constructor]
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Installs `platform` as the default, replacing any previous one.
    pub fn register(&self, platform: Arc<StoreKitPlatform>) {
        let mut instance = self
            .instance
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if instance.replace(platform).is_some() {
            log::info!("replaced registered storekit platform");
        }
    }

    /// Builds a platform from `provider` and installs it as the default.
    #[must_use]
    pub fn register_platform(
        &self,
        provider: Arc<dyn StoreKitProvider>,
        config: PlatformConfig,
    ) -> Arc<StoreKitPlatform> {
        let platform = StoreKitPlatform::new(provider, config);
        self.register(Arc::clone(&platform));
        platform
    }

    /// The registered platform, if any.
    #[must_use]
    pub fn instance(&self) -> Option<Arc<StoreKitPlatform>> {
        self.instance
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
