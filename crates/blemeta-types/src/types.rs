//! Core types for normalized advertisement metadata.

use core::fmt;
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Buf;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Lowercase a service UUID string so it compares equal across platforms.
///
/// No syntax validation is performed.
///
/// # Examples
///
/// ```
/// use blemeta_types::normalize_uuid;
///
/// assert_eq!(normalize_uuid("0000180F-0000-1000-8000-00805F9B34FB"),
///            "0000180f-0000-1000-8000-00805f9b34fb");
/// ```
#[must_use]
pub fn normalize_uuid(uuid: &str) -> String {
    uuid.to_lowercase()
}

/// Vendor-specific advertisement payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManufacturerData {
    /// Bluetooth SIG company identifier.
    pub id: u16,
    /// Payload bytes following the company identifier.
    pub data: Vec<u8>,
}

impl ManufacturerData {
    /// Create manufacturer data from an already split identifier and payload.
    pub fn new(id: u16, data: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            data: data.into(),
        }
    }

    /// Decode manufacturer data in BLE wire order.
    ///
    /// The first two bytes are the company identifier (u16 little-endian),
    /// the remaining bytes are copied into an owned payload.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedAdvertisement`] if fewer than 2 bytes
    /// are supplied.
    ///
    /// # Examples
    ///
    /// ```
    /// use blemeta_types::ManufacturerData;
    ///
    /// let mfg = ManufacturerData::from_prefixed(&[0x4C, 0x00, 0x02, 0x15]).unwrap();
    /// assert_eq!(mfg.id, 0x004C);
    /// assert_eq!(mfg.data, vec![0x02, 0x15]);
    /// ```
    pub fn from_prefixed(bytes: &[u8]) -> ParseResult<Self> {
        if bytes.len() < 2 {
            return Err(ParseError::malformed(
                "manufacturer_data",
                format!(
                    "requires at least 2 bytes for company id, got {}",
                    bytes.len()
                ),
            ));
        }

        let mut buf = bytes;
        let id = buf.get_u16_le();
        Ok(Self {
            id,
            data: buf.to_vec(),
        })
    }
}

/// Normalized, platform-independent view of one advertisement event.
///
/// Every field is owned. Nothing borrows from the platform payload the
/// advertisement was decoded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecodedAdvertisement {
    /// Lowercase service UUIDs, in advertised order.
    pub uuids: Vec<String>,
    /// Manufacturer data carried by the advertisement.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub manufacturer: Option<ManufacturerData>,
    /// Further manufacturer entries from stacks that report several at once.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub extra_manufacturers: Vec<ManufacturerData>,
    /// Advertised local name.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub local_name: Option<String>,
    /// Advertised transmit power level in dBm.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub tx_power: Option<i16>,
    /// Whether the advertisement was connectable.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub connectable: Option<bool>,
}

impl DecodedAdvertisement {
    /// Create an empty advertisement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add service UUIDs, lowercasing each one.
    #[must_use]
    pub fn with_uuids<I, S>(mut self, uuids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.uuids
            .extend(uuids.into_iter().map(|u| normalize_uuid(u.as_ref())));
        self
    }

    /// Set the manufacturer data.
    #[must_use]
    pub fn with_manufacturer(mut self, id: u16, data: impl Into<Vec<u8>>) -> Self {
        self.manufacturer = Some(ManufacturerData::new(id, data));
        self
    }

    /// Set the local name.
    #[must_use]
    pub fn with_local_name(mut self, name: impl Into<String>) -> Self {
        self.local_name = Some(name.into());
        self
    }

    /// Set the transmit power level.
    #[must_use]
    pub fn with_tx_power(mut self, tx_power: i16) -> Self {
        self.tx_power = Some(tx_power);
        self
    }

    /// Set the connectable flag.
    #[must_use]
    pub fn with_connectable(mut self, connectable: bool) -> Self {
        self.connectable = Some(connectable);
        self
    }

    /// Fill the manufacturer fields from a map keyed by company identifier.
    ///
    /// The lowest identifier becomes [`Self::manufacturer`]; the rest land in
    /// [`Self::extra_manufacturers`] in ascending order. An empty map leaves
    /// both fields untouched.
    pub fn set_manufacturer_map<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (&'a u16, &'a Vec<u8>)>,
    {
        let mut sorted: Vec<ManufacturerData> = entries
            .into_iter()
            .map(|(id, data)| ManufacturerData::new(*id, data.clone()))
            .collect();
        sorted.sort_by_key(|m| m.id);

        let mut iter = sorted.into_iter();
        if let Some(first) = iter.next() {
            self.manufacturer = Some(first);
            self.extra_manufacturers = iter.collect();
        }
    }

    /// Iterate over every manufacturer entry, primary first.
    pub fn manufacturers(&self) -> impl Iterator<Item = &ManufacturerData> {
        self.manufacturer
            .iter()
            .chain(self.extra_manufacturers.iter())
    }

    /// Returns `true` if the advertisement carries no metadata at all.
    pub fn is_empty(&self) -> bool {
        self.uuids.is_empty()
            && self.manufacturer.is_none()
            && self.extra_manufacturers.is_empty()
            && self.local_name.is_none()
            && self.tx_power.is_none()
            && self.connectable.is_none()
    }
}

/// Metadata accumulated for one device across advertisement observations.
///
/// Deserialized input goes through [`DeviceMetadata::insert_uuid`], so loaded
/// UUIDs are lowercase and unique like merged ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "MetadataRepr"))]
pub struct DeviceMetadata {
    uuids: Vec<String>,
    manufacturer_data: BTreeMap<u16, Vec<u8>>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    tx_power: Option<i16>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    connectable: Option<bool>,
}

impl DeviceMetadata {
    /// Service UUIDs in first-seen order, lowercase and without duplicates.
    pub fn uuids(&self) -> &[String] {
        &self.uuids
    }

    /// Manufacturer payloads keyed by company identifier.
    pub fn manufacturer_data(&self) -> &BTreeMap<u16, Vec<u8>> {
        &self.manufacturer_data
    }

    /// Last advertised transmit power level.
    pub fn tx_power(&self) -> Option<i16> {
        self.tx_power
    }

    /// Last advertised connectable flag.
    pub fn connectable(&self) -> Option<bool> {
        self.connectable
    }

    /// Returns `true` if the service UUID has been seen (case-insensitive).
    pub fn has_uuid(&self, uuid: &str) -> bool {
        let uuid = normalize_uuid(uuid);
        self.uuids.contains(&uuid)
    }

    /// Add a service UUID if not already present.
    ///
    /// Returns `true` if the UUID was new.
    pub fn insert_uuid(&mut self, uuid: &str) -> bool {
        let uuid = normalize_uuid(uuid);
        if self.uuids.contains(&uuid) {
            return false;
        }
        self.uuids.push(uuid);
        true
    }

    /// Store the payload for a company identifier, replacing any previous one.
    ///
    /// Returns `true` if the stored bytes changed.
    pub fn insert_manufacturer_data(&mut self, id: u16, data: &[u8]) -> bool {
        match self.manufacturer_data.get(&id) {
            Some(existing) if existing.as_slice() == data => false,
            _ => {
                self.manufacturer_data.insert(id, data.to_vec());
                true
            }
        }
    }

    /// Set the transmit power level.
    pub fn set_tx_power(&mut self, tx_power: i16) {
        self.tx_power = Some(tx_power);
    }

    /// Set the connectable flag.
    pub fn set_connectable(&mut self, connectable: bool) {
        self.connectable = Some(connectable);
    }
}

/// Unchecked wire form of [`DeviceMetadata`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct MetadataRepr {
    #[serde(default)]
    uuids: Vec<String>,
    #[serde(default)]
    manufacturer_data: BTreeMap<u16, Vec<u8>>,
    #[serde(default)]
    tx_power: Option<i16>,
    #[serde(default)]
    connectable: Option<bool>,
}

#[cfg(feature = "serde")]
impl From<MetadataRepr> for DeviceMetadata {
    fn from(repr: MetadataRepr) -> Self {
        let mut metadata = DeviceMetadata {
            tx_power: repr.tx_power,
            connectable: repr.connectable,
            ..Default::default()
        };
        for uuid in &repr.uuids {
            metadata.insert_uuid(uuid);
        }
        for (id, data) in &repr.manufacturer_data {
            metadata.insert_manufacturer_data(*id, data);
        }
        metadata
    }
}

/// Opaque handle to the platform object backing a discovered device.
///
/// The discovery layer owns the object; records only hold a shared handle
/// and never look inside it.
#[derive(Clone)]
pub struct Details(Arc<dyn Any + Send + Sync>);

impl Details {
    /// Wrap a platform object.
    pub fn new<T: Any + Send + Sync>(inner: T) -> Self {
        Self(Arc::new(inner))
    }

    /// Borrow the platform object if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Details {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Details(..)")
    }
}

/// A discovered device and its accumulated advertisement metadata.
///
/// Created on first observation of an address. The address never changes
/// afterwards.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    address: String,
    name: Option<String>,
    rssi: Option<i16>,
    metadata: DeviceMetadata,
    details: Option<Details>,
}

impl DeviceRecord {
    /// Create a record for a newly observed address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
            rssi: None,
            metadata: DeviceMetadata::default(),
            details: None,
        }
    }

    /// Attach the backing platform object.
    #[must_use]
    pub fn with_details(mut self, details: Details) -> Self {
        self.details = Some(details);
        self
    }

    /// Platform-stable identifier of the device.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Last advertised name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Signal strength at the last observation.
    pub fn rssi(&self) -> Option<i16> {
        self.rssi
    }

    /// Accumulated advertisement metadata.
    pub fn metadata(&self) -> &DeviceMetadata {
        &self.metadata
    }

    /// Mutable access to the accumulated metadata.
    pub fn metadata_mut(&mut self) -> &mut DeviceMetadata {
        &mut self.metadata
    }

    /// Handle to the backing platform object, if any.
    pub fn details(&self) -> Option<&Details> {
        self.details.as_ref()
    }

    /// Set the advertised name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Set the signal strength.
    pub fn set_rssi(&mut self, rssi: i16) {
        self.rssi = Some(rssi);
    }

    /// Replace the backing platform object.
    pub fn set_details(&mut self, details: Details) {
        self.details = Some(details);
    }
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.address,
            self.name.as_deref().unwrap_or("Unknown")
        )
    }
}
