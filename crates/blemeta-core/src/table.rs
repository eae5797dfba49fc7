//! Device table fed by advertisement callbacks.
//!
//! [`DeviceTable`] is the handler a discovery loop calls for every
//! advertisement event. It decodes the payload, applies the configured
//! filters and merges the result into the record for that address. It
//! never starts or stops a scan.
//!
//! # Concurrency
//!
//! Each record sits behind its own mutex, so advertisements for the same
//! address merge one at a time while different addresses proceed in
//! parallel. The outer map lock is only held to look up or insert an entry.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use blemeta_core::{DecoderRegistry, DeviceTable, Platform, RawPayload};
//! use blemeta_core::keys::{CB_MANUFACTURER_DATA, CB_SERVICE_UUIDS};
//!
//! let table = DeviceTable::new(Arc::new(DecoderRegistry::with_defaults()));
//! let raw = RawPayload::new()
//!     .with(CB_SERVICE_UUIDS, vec!["AA:BB"])
//!     .with(CB_MANUFACTURER_DATA, vec![0x4Cu8, 0x00, 0xFF]);
//!
//! let record = table
//!     .on_advertisement("peripheral-1", Platform::CoreBluetooth, &raw, Some(-60), None)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(record.metadata().uuids(), ["aa:bb"]);
//! assert_eq!(record.rssi(), Some(-60));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use btleplug::api::PeripheralProperties;
use tracing::{debug, trace};

use blemeta_types::{normalize_uuid, DecodedAdvertisement, DeviceRecord, Details};

use crate::config::DiscoveryConfig;
use crate::error::Result;
use crate::merger::merge;
use crate::platform::Platform;
use crate::properties::decode_properties;
use crate::raw::RawPayload;
use crate::registry::DecoderRegistry;

type SharedRecord = Arc<Mutex<DeviceRecord>>;

/// Records for every device observed during a scan session, keyed by address.
#[derive(Debug)]
pub struct DeviceTable {
    registry: Arc<DecoderRegistry>,
    filter: DiscoveryConfig,
    records: RwLock<HashMap<String, SharedRecord>>,
}

impl DeviceTable {
    /// Create a table that accepts every advertisement.
    pub fn new(registry: Arc<DecoderRegistry>) -> Self {
        Self::with_filter(registry, DiscoveryConfig::default())
    }

    /// Create a table that only admits devices matching `filter`.
    pub fn with_filter(registry: Arc<DecoderRegistry>, filter: DiscoveryConfig) -> Self {
        let filter = DiscoveryConfig {
            service_uuids: filter
                .service_uuids
                .iter()
                .map(|u| normalize_uuid(u))
                .collect(),
            manufacturer_ids: filter.manufacturer_ids,
        };
        Self {
            registry,
            filter,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Handle one advertisement event from the discovery layer.
    ///
    /// Returns a snapshot of the updated record, or `None` if the device
    /// did not pass the filters.
    ///
    /// # Errors
    ///
    /// Returns the decode error if the payload is malformed or the platform
    /// has no decoder. The table is left untouched in that case; callers
    /// should drop the event and keep scanning.
    pub fn on_advertisement(
        &self,
        address: &str,
        platform: Platform,
        raw: &RawPayload,
        rssi: Option<i16>,
        details: Option<Details>,
    ) -> Result<Option<DeviceRecord>> {
        let decoded = self.registry.decode(platform, raw).inspect_err(|e| {
            debug!("Dropping advertisement from {} ({}): {}", address, platform, e);
        })?;
        Ok(self.apply(address, &decoded, rssi, details))
    }

    /// Handle properties reported by btleplug for a peripheral.
    ///
    /// `address` should come from [`crate::properties::properties_address`]
    /// or, where the stack hides it, the peripheral id.
    pub fn on_properties(
        &self,
        address: &str,
        props: &PeripheralProperties,
        details: Option<Details>,
    ) -> Option<DeviceRecord> {
        let decoded = decode_properties(props);
        self.apply(address, &decoded, props.rssi, details)
    }

    /// Merge an already decoded advertisement.
    pub fn apply(
        &self,
        address: &str,
        decoded: &DecodedAdvertisement,
        rssi: Option<i16>,
        details: Option<Details>,
    ) -> Option<DeviceRecord> {
        let entry = match self.entry(address) {
            Some(entry) => entry,
            None if self.accepts(decoded) => self.insert(address),
            None => {
                trace!("Ignoring {}: does not match discovery filter", address);
                return None;
            }
        };

        let mut record = lock(&entry);
        if let Some(details) = details {
            record.set_details(details);
        }
        merge(&mut record, decoded, rssi);
        Some(record.clone())
    }

    /// Snapshot of the record for `address`.
    pub fn get(&self, address: &str) -> Option<DeviceRecord> {
        self.entry(address).map(|entry| lock(&entry).clone())
    }

    /// Snapshots of every record, sorted by address.
    pub fn devices(&self) -> Vec<DeviceRecord> {
        let entries: Vec<SharedRecord> = self.read().values().cloned().collect();
        let mut devices: Vec<DeviceRecord> = entries.iter().map(|e| lock(e).clone()).collect();
        devices.sort_by(|a, b| a.address().cmp(b.address()));
        devices
    }

    /// Number of known devices.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no device has been recorded.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Evict a single device, returning its last snapshot.
    pub fn remove(&self, address: &str) -> Option<DeviceRecord> {
        let entry = self.write().remove(address)?;
        let record = lock(&entry).clone();
        Some(record)
    }

    /// Evict every device, e.g. at the end of a scan session.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Returns `true` if a new device advertising `decoded` should be recorded.
    fn accepts(&self, decoded: &DecodedAdvertisement) -> bool {
        if self.filter.accepts_all() {
            return true;
        }
        let uuid_match = decoded
            .uuids
            .iter()
            .any(|u| self.filter.service_uuids.contains(&normalize_uuid(u)));
        let mfg_match = decoded
            .manufacturers()
            .any(|m| self.filter.manufacturer_ids.contains(&m.id));
        uuid_match || mfg_match
    }

    fn entry(&self, address: &str) -> Option<SharedRecord> {
        self.read().get(address).cloned()
    }

    fn insert(&self, address: &str) -> SharedRecord {
        let mut records = self.write();
        Arc::clone(records.entry(address.to_string()).or_insert_with(|| {
            debug!("New device: {}", address);
            Arc::new(Mutex::new(DeviceRecord::new(address)))
        }))
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, SharedRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, SharedRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock(record: &SharedRecord) -> MutexGuard<'_, DeviceRecord> {
    record.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use blemeta_types::keys::{
        BLUEZ_MANUFACTURER_DATA, BLUEZ_UUIDS, CB_LOCAL_NAME, CB_MANUFACTURER_DATA,
        CB_SERVICE_UUIDS,
    };

    fn table() -> DeviceTable {
        DeviceTable::new(Arc::new(DecoderRegistry::with_defaults()))
    }

    #[test]
    fn test_first_observation_creates_record() {
        let table = table();
        assert!(table.is_empty());

        let raw = RawPayload::new().with(CB_LOCAL_NAME, "Sensor");
        let record = table
            .on_advertisement("a", Platform::CoreBluetooth, &raw, Some(-50), None)
            .unwrap()
            .unwrap();

        assert_eq!(record.address(), "a");
        assert_eq!(record.name(), Some("Sensor"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_repeated_observations_accumulate() {
        let table = table();
        let first = RawPayload::new().with(CB_SERVICE_UUIDS, vec!["AAAA"]);
        let second = RawPayload::new().with(CB_SERVICE_UUIDS, vec!["BBBB"]);

        table
            .on_advertisement("a", Platform::CoreBluetooth, &first, None, None)
            .unwrap();
        table
            .on_advertisement("a", Platform::CoreBluetooth, &second, None, None)
            .unwrap();

        let record = table.get("a").unwrap();
        assert_eq!(record.metadata().uuids(), ["aaaa", "bbbb"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_malformed_leaves_record_untouched() {
        let table = table();
        let good = RawPayload::new().with(CB_MANUFACTURER_DATA, vec![0x4Cu8, 0x00, 0x01]);
        table
            .on_advertisement("a", Platform::CoreBluetooth, &good, Some(-40), None)
            .unwrap();
        let before = table.get("a").unwrap();

        let bad = RawPayload::new()
            .with(CB_SERVICE_UUIDS, vec!["CCCC"])
            .with(CB_MANUFACTURER_DATA, vec![0x4Cu8]);
        let err = table
            .on_advertisement("a", Platform::CoreBluetooth, &bad, Some(-90), None)
            .unwrap_err();
        assert!(err.is_per_event());

        let after = table.get("a").unwrap();
        assert_eq!(after.metadata(), before.metadata());
        assert_eq!(after.rssi(), Some(-40));
    }

    #[test]
    fn test_malformed_first_observation_creates_nothing() {
        let table = table();
        let bad = RawPayload::new().with(CB_MANUFACTURER_DATA, vec![0x4Cu8]);
        assert!(table
            .on_advertisement("a", Platform::CoreBluetooth, &bad, None, None)
            .is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_unsupported_platform() {
        let table = DeviceTable::new(Arc::new(DecoderRegistry::new()));
        let err = table
            .on_advertisement("a", Platform::WinRt, &RawPayload::new(), None, None)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform(_)));
    }

    #[test]
    fn test_filter_by_service_uuid() {
        let filter = DiscoveryConfig {
            service_uuids: vec!["FCE0".to_string()],
            manufacturer_ids: Vec::new(),
        };
        let table = DeviceTable::with_filter(Arc::new(DecoderRegistry::with_defaults()), filter);

        let other = RawPayload::new().with(BLUEZ_UUIDS, vec!["180f"]);
        assert!(table
            .on_advertisement("x", Platform::BlueZ, &other, None, None)
            .unwrap()
            .is_none());

        let wanted = RawPayload::new().with(BLUEZ_UUIDS, vec!["fce0"]);
        assert!(table
            .on_advertisement("y", Platform::BlueZ, &wanted, None, None)
            .unwrap()
            .is_some());

        // Once admitted, later packets without the UUID still merge.
        let rssi_only = RawPayload::new();
        let record = table
            .on_advertisement("y", Platform::BlueZ, &rssi_only, Some(-30), None)
            .unwrap()
            .unwrap();
        assert_eq!(record.rssi(), Some(-30));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_filter_matches_hand_built_uppercase_uuid() {
        let filter = DiscoveryConfig {
            service_uuids: vec!["fce0".to_string()],
            manufacturer_ids: Vec::new(),
        };
        let table = DeviceTable::with_filter(Arc::new(DecoderRegistry::with_defaults()), filter);

        let decoded = DecodedAdvertisement {
            uuids: vec!["FCE0".to_string()],
            ..Default::default()
        };
        let record = table.apply("z", &decoded, None, None).unwrap();
        assert_eq!(record.metadata().uuids(), ["fce0"]);
    }

    #[test]
    fn test_filter_by_manufacturer_id() {
        let filter = DiscoveryConfig {
            service_uuids: Vec::new(),
            manufacturer_ids: vec![0x0702],
        };
        let table = DeviceTable::with_filter(Arc::new(DecoderRegistry::with_defaults()), filter);

        let raw = RawPayload::new().with(BLUEZ_MANUFACTURER_DATA, vec![0x02u8, 0x07, 0x21]);
        let record = table
            .on_advertisement("aranet", Platform::BlueZ, &raw, None, None)
            .unwrap()
            .unwrap();
        assert_eq!(record.metadata().manufacturer_data().get(&0x0702), Some(&vec![0x21]));

        let apple = RawPayload::new().with(BLUEZ_MANUFACTURER_DATA, vec![0x4Cu8, 0x00]);
        assert!(table
            .on_advertisement("phone", Platform::BlueZ, &apple, None, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_details_are_attached() {
        let table = table();
        let record = table
            .on_advertisement(
                "a",
                Platform::WinRt,
                &RawPayload::new(),
                None,
                Some(Details::new(42u64)),
            )
            .unwrap()
            .unwrap();
        assert_eq!(record.details().and_then(|d| d.downcast_ref::<u64>()), Some(&42));
    }

    #[test]
    fn test_on_properties() {
        let table = table();
        let mut props = PeripheralProperties::default();
        props.rssi = Some(-55);
        props.local_name = Some("Aranet4 12345".to_string());
        props.manufacturer_data.insert(0x0702, vec![0x21]);

        let record = table.on_properties("AA:BB:CC:DD:EE:FF", &props, None).unwrap();
        assert_eq!(record.rssi(), Some(-55));
        assert_eq!(record.name(), Some("Aranet4 12345"));
        assert_eq!(record.metadata().manufacturer_data().len(), 1);
    }

    #[test]
    fn test_devices_sorted_and_eviction() {
        let table = table();
        for address in ["c", "a", "b"] {
            table.apply(address, &DecodedAdvertisement::new(), None, None);
        }

        let addresses: Vec<String> = table
            .devices()
            .iter()
            .map(|d| d.address().to_string())
            .collect();
        assert_eq!(addresses, vec!["a", "b", "c"]);

        assert_eq!(table.remove("b").map(|r| r.address().to_string()), Some("b".to_string()));
        assert!(table.remove("b").is_none());
        assert_eq!(table.len(), 2);

        table.clear();
        assert!(table.is_empty());
    }

    #[test]
    fn test_concurrent_advertisements() {
        let table = Arc::new(table());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        let uuid = format!("{:04X}", j % 10);
                        let raw = RawPayload::new().with(CB_SERVICE_UUIDS, vec![uuid]);
                        let address = if i % 2 == 0 { "shared" } else { "other" };
                        let rssi = Some(-(j as i16));
                        table
                            .on_advertisement(address, Platform::CoreBluetooth, &raw, rssi, None)
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(table.len(), 2);
        let shared = table.get("shared").unwrap();
        assert_eq!(shared.metadata().uuids().len(), 10);
    }
}
