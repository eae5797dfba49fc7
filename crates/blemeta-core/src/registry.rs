//! Platform decoder registry.
//!
//! The registry maps a [`Platform`] tag to the [`AdvertisementDecoder`] for
//! that stack. It is populated once at startup and shared read-only
//! afterwards, typically behind an `Arc`.
//!
//! # Example
//!
//! ```
//! use blemeta_core::{DecoderRegistry, Platform, RawPayload};
//! use blemeta_core::keys::CB_SERVICE_UUIDS;
//!
//! let registry = DecoderRegistry::with_defaults();
//! let raw = RawPayload::new().with(CB_SERVICE_UUIDS, vec!["180F"]);
//! let decoded = registry.decode(Platform::CoreBluetooth, &raw).unwrap();
//! assert_eq!(decoded.uuids, vec!["180f"]);
//! ```

use std::collections::HashMap;
use std::fmt;

use blemeta_types::DecodedAdvertisement;
use tracing::{debug, info};

use crate::config::DecoderConfig;
use crate::decoder::AdvertisementDecoder;
use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::raw::RawPayload;
use crate::{bluez, corebluetooth, winrt};

/// Maps platform tags to advertisement decoders.
#[derive(Default)]
pub struct DecoderRegistry {
    decoders: HashMap<Platform, Box<dyn AdvertisementDecoder>>,
    default_platform: Option<Platform>,
}

impl DecoderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in decoder for every platform.
    ///
    /// The default platform is the one the crate was compiled for.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for platform in Platform::ALL {
            registry.register(platform, builtin(platform));
        }
        registry.default_platform = Platform::current();
        registry
    }

    /// Create a registry containing only the platforms enabled in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if no platform is enabled and
    /// [`Error::UnsupportedPlatform`] if the configured default platform
    /// has no enabled decoder.
    pub fn from_config(config: &DecoderConfig) -> Result<Self> {
        if config.enabled.is_empty() {
            return Err(Error::invalid_config("no decoders enabled"));
        }

        let mut registry = Self::new();
        for &platform in &config.enabled {
            registry.register(platform, builtin(platform));
        }

        if let Some(default) = config.default_platform {
            if !registry.supports(default) {
                return Err(Error::unsupported_platform(default.as_str()));
            }
            registry.default_platform = Some(default);
        }

        info!(
            "Decoder registry ready: {:?} (default: {:?})",
            registry.platforms(),
            registry.default_platform
        );
        Ok(registry)
    }

    /// Register a decoder for a platform, replacing any earlier one.
    pub fn register<D>(&mut self, platform: Platform, decoder: D)
    where
        D: AdvertisementDecoder + 'static,
    {
        if self.decoders.insert(platform, Box::new(decoder)).is_some() {
            debug!("Replaced decoder for {}", platform);
        }
    }

    /// Decode a raw payload with the decoder registered for `platform`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlatform`] if no decoder is registered,
    /// or the decoder's [`Error::MalformedAdvertisement`].
    pub fn decode(&self, platform: Platform, raw: &RawPayload) -> Result<DecodedAdvertisement> {
        let decoder = self.decoders.get(&platform).ok_or_else(|| {
            debug!("No decoder registered for {}", platform);
            Error::unsupported_platform(platform.as_str())
        })?;
        decoder.decode(raw)
    }

    /// Decode with the default platform's decoder.
    pub fn decode_default(&self, raw: &RawPayload) -> Result<DecodedAdvertisement> {
        let platform = self
            .default_platform
            .ok_or_else(|| Error::unsupported_platform("no default platform"))?;
        self.decode(platform, raw)
    }

    /// Returns `true` if a decoder is registered for `platform`.
    pub fn supports(&self, platform: Platform) -> bool {
        self.decoders.contains_key(&platform)
    }

    /// Registered platforms, sorted.
    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.decoders.keys().copied().collect();
        platforms.sort();
        platforms
    }

    /// Platform used by [`Self::decode_default`].
    pub fn default_platform(&self) -> Option<Platform> {
        self.default_platform
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderRegistry")
            .field("platforms", &self.platforms())
            .field("default_platform", &self.default_platform)
            .finish()
    }
}

fn builtin(platform: Platform) -> fn(&RawPayload) -> Result<DecodedAdvertisement> {
    match platform {
        Platform::CoreBluetooth => corebluetooth::decode,
        Platform::BlueZ => bluez::decode,
        Platform::WinRt => winrt::decode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blemeta_types::keys::{BLUEZ_UUIDS, WINRT_LOCAL_NAME};

    #[test]
    fn test_with_defaults_registers_all() {
        let registry = DecoderRegistry::with_defaults();
        assert_eq!(registry.platforms(), Platform::ALL.to_vec());
        assert_eq!(registry.default_platform(), Platform::current());
    }

    #[test]
    fn test_decode_dispatches_by_platform() {
        let registry = DecoderRegistry::with_defaults();
        let raw = RawPayload::new()
            .with(BLUEZ_UUIDS, vec!["AAAA"])
            .with(WINRT_LOCAL_NAME, "win");

        let bluez = registry.decode(Platform::BlueZ, &raw).unwrap();
        assert_eq!(bluez.uuids, vec!["aaaa"]);
        assert!(bluez.local_name.is_none());

        let winrt = registry.decode(Platform::WinRt, &raw).unwrap();
        assert!(winrt.uuids.is_empty());
        assert_eq!(winrt.local_name.as_deref(), Some("win"));
    }

    #[test]
    fn test_unregistered_platform() {
        let registry = DecoderRegistry::new();
        let err = registry
            .decode(Platform::CoreBluetooth, &RawPayload::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform(ref p) if p == "corebluetooth"));
        assert!(registry.decode_default(&RawPayload::new()).is_err());
    }

    #[test]
    fn test_register_custom_decoder_replaces() {
        let mut registry = DecoderRegistry::with_defaults();
        registry.register(Platform::BlueZ, |_: &RawPayload| -> Result<DecodedAdvertisement> {
            Ok(DecodedAdvertisement::new().with_local_name("custom"))
        });

        let decoded = registry.decode(Platform::BlueZ, &RawPayload::new()).unwrap();
        assert_eq!(decoded.local_name.as_deref(), Some("custom"));
        assert_eq!(registry.platforms().len(), 3);
    }

    #[test]
    fn test_from_config_subset() {
        let config = DecoderConfig {
            default_platform: Some(Platform::WinRt),
            enabled: vec![Platform::WinRt],
        };
        let registry = DecoderRegistry::from_config(&config).unwrap();
        assert!(registry.supports(Platform::WinRt));
        assert!(!registry.supports(Platform::BlueZ));
        assert_eq!(registry.default_platform(), Some(Platform::WinRt));
        assert!(registry.decode_default(&RawPayload::new()).is_ok());
    }

    #[test]
    fn test_from_config_default_not_enabled() {
        let config = DecoderConfig {
            default_platform: Some(Platform::CoreBluetooth),
            enabled: vec![Platform::BlueZ],
        };
        let err = DecoderRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform(_)));
    }

    #[test]
    fn test_from_config_nothing_enabled() {
        let config = DecoderConfig {
            default_platform: None,
            enabled: Vec::new(),
        };
        let err = DecoderRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DecoderRegistry>();
    }
}
