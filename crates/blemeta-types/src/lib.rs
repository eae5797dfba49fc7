//! Platform-agnostic types for BLE advertisement metadata.
//!
//! This crate provides the normalized value types shared by every platform
//! decoder in blemeta-core, independent of any Bluetooth stack.
//!
//! # Features
//!
//! - Decoded advertisement value object
//! - Merge-safe device record and metadata
//! - Platform advertisement keys and company identifiers
//! - Error types for advertisement decoding
//!
//! # Example
//!
//! ```
//! use blemeta_types::{DecodedAdvertisement, DeviceRecord};
//!
//! let adv = DecodedAdvertisement::new().with_uuids(["0000180F-0000-1000-8000-00805F9B34FB"]);
//! assert_eq!(adv.uuids[0], "0000180f-0000-1000-8000-00805f9b34fb");
//!
//! let record = DeviceRecord::new("AA:BB:CC:DD:EE:FF");
//! assert!(record.metadata().uuids().is_empty());
//! ```

pub mod error;
pub mod keys;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use types::{
    normalize_uuid, DecodedAdvertisement, DeviceMetadata, DeviceRecord, Details,
    ManufacturerData,
};


/// Property-based tests for advertisement value types.
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Decoding arbitrary manufacturer bytes never panics, and
        /// succeeds exactly when the company id is present.
        #[test]
        fn from_prefixed_never_panics(data: Vec<u8>) {
            let result = ManufacturerData::from_prefixed(&data);
            prop_assert_eq!(result.is_ok(), data.len() >= 2);
            if let Ok(mfg) = result {
                prop_assert_eq!(mfg.data.as_slice(), &data[2..]);
            }
        }

        /// Inserted UUIDs are always stored lowercase and unique.
        #[test]
        fn insert_uuid_keeps_set_invariant(uuids in proptest::collection::vec("[A-Fa-f0-9:-]{1,12}", 0..20)) {
            let mut metadata = DeviceMetadata::default();
            for uuid in &uuids {
                metadata.insert_uuid(uuid);
            }
            let stored = metadata.uuids();
            for (i, uuid) in stored.iter().enumerate() {
                prop_assert_eq!(uuid, &uuid.to_lowercase());
                prop_assert!(!stored[i + 1..].contains(uuid));
            }
        }
    }
}
