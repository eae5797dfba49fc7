//! Cross-platform BLE advertisement metadata normalization.
//!
//! This crate turns the advertisement payloads delivered by native BLE
//! stacks into one stable, merge-safe device metadata model, so callers see
//! the same shape regardless of which stack discovered the device.
//!
//! # Features
//!
//! - **Typed platform decoders**: CoreBluetooth, BlueZ and WinRT payloads
//! - **Decoder registry**: select a decoder by [`Platform`] tag
//! - **Merge engine**: union service UUIDs, replace manufacturer data per company id
//! - **Device table**: per-address records with per-record locking
//! - **btleplug bridge**: feed `PeripheralProperties` straight into the merge step
//!
//! # Platform Differences
//!
//! | Stack | UUID form | Manufacturer data |
//! |-------|-----------|-------------------|
//! | CoreBluetooth | Uppercase `CBUUID` strings | Wire bytes, company id first |
//! | BlueZ | Lowercase strings | Dictionary keyed by company id |
//! | WinRT | `GUID` strings | Wire bytes, company id first |
//!
//! Service UUIDs are always stored lowercase and manufacturer payloads are
//! always keyed by a little-endian decoded `u16` company id.
//!
//! # Quick Start
//!
//! ```
//! use blemeta_core::{decode, merge, Platform, RawPayload};
//! use blemeta_core::keys::{CB_MANUFACTURER_DATA, CB_SERVICE_UUIDS};
//! use blemeta_core::types::DeviceRecord;
//!
//! let raw = RawPayload::new()
//!     .with(CB_SERVICE_UUIDS, vec!["AA:BB"])
//!     .with(CB_MANUFACTURER_DATA, vec![0x4Cu8, 0x00, 0xFF]);
//!
//! let decoded = decode(Platform::CoreBluetooth, &raw)?;
//! let mut record = DeviceRecord::new("peripheral-1");
//! merge(&mut record, &decoded, Some(-60));
//!
//! assert_eq!(record.metadata().uuids(), ["aa:bb"]);
//! assert_eq!(record.metadata().manufacturer_data()[&76], vec![0xFF]);
//! # Ok::<(), blemeta_core::Error>(())
//! ```

pub mod bluez;
pub mod config;
pub mod corebluetooth;
pub mod decoder;
pub mod error;
pub mod merger;
pub mod platform;
pub mod properties;
pub mod raw;
pub mod registry;
pub mod table;
pub mod winrt;

// Re-export types and keys modules from blemeta-types
pub use blemeta_types::keys;
pub use blemeta_types::types;

// Core exports
pub use config::{Config, ConfigError, DecoderConfig, DiscoveryConfig, ValidationError};
pub use decoder::AdvertisementDecoder;
pub use error::{Error, Result};
pub use merger::{merge, MergeSummary};
pub use platform::Platform;
pub use properties::{decode_properties, properties_address};
pub use raw::{RawPayload, RawValue};
pub use registry::DecoderRegistry;
pub use table::DeviceTable;

// Re-export from blemeta-types
pub use blemeta_types::{
    DecodedAdvertisement, DeviceMetadata, DeviceRecord, Details, ManufacturerData, ParseError,
};

/// Decode a raw payload with the built-in decoder for `platform`.
///
/// This bypasses the [`DecoderRegistry`]; use a registry when decoders need
/// to be configured or replaced.
pub fn decode(platform: Platform, raw: &RawPayload) -> Result<DecodedAdvertisement> {
    match platform {
        Platform::CoreBluetooth => corebluetooth::decode(raw),
        Platform::BlueZ => bluez::decode(raw),
        Platform::WinRt => winrt::decode(raw),
    }
}
