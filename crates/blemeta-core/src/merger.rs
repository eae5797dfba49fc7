//! Folding decoded advertisements into device records.
//!
//! Per-field policy:
//!
//! | Field | Policy |
//! |-------|--------|
//! | rssi | Overwrite when a reading is supplied |
//! | service UUIDs | Set union, first-seen order kept |
//! | manufacturer data | Replace per company id, other ids untouched |
//! | name, tx power, connectable | Overwrite when present |
//!
//! Absent or empty fields never clear accumulated data. Merging the same
//! advertisement twice leaves the record as merging it once did.

use blemeta_types::{DecodedAdvertisement, DeviceRecord};
use tracing::trace;

/// What a merge changed, for logging and change detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Service UUIDs that were not already recorded.
    pub new_uuids: usize,
    /// Manufacturer entries whose payload changed or was added.
    pub manufacturer_updates: usize,
    /// Whether the stored name changed.
    pub name_changed: bool,
    /// Whether the stored transmit power changed.
    pub tx_power_changed: bool,
    /// Whether the stored connectable flag changed.
    pub connectable_changed: bool,
}

impl MergeSummary {
    /// Returns `true` if the merge changed any accumulated metadata.
    ///
    /// RSSI is not counted; it changes on nearly every observation.
    pub fn changed(&self) -> bool {
        self.new_uuids > 0
            || self.manufacturer_updates > 0
            || self.name_changed
            || self.tx_power_changed
            || self.connectable_changed
    }
}

/// Merge a decoded advertisement into `record` in place.
///
/// The decoder is solely responsible for rejecting malformed input, so this
/// step cannot fail.
pub fn merge(
    record: &mut DeviceRecord,
    decoded: &DecodedAdvertisement,
    rssi: Option<i16>,
) -> MergeSummary {
    let mut summary = MergeSummary::default();

    if let Some(rssi) = rssi {
        record.set_rssi(rssi);
    }

    let metadata = record.metadata_mut();
    for uuid in &decoded.uuids {
        if metadata.insert_uuid(uuid) {
            summary.new_uuids += 1;
        }
    }

    for mfg in decoded.manufacturers() {
        if metadata.insert_manufacturer_data(mfg.id, &mfg.data) {
            summary.manufacturer_updates += 1;
        }
    }

    if let Some(tx_power) = decoded.tx_power {
        summary.tx_power_changed = metadata.tx_power() != Some(tx_power);
        metadata.set_tx_power(tx_power);
    }
    if let Some(connectable) = decoded.connectable {
        summary.connectable_changed = metadata.connectable() != Some(connectable);
        metadata.set_connectable(connectable);
    }

    if let Some(name) = &decoded.local_name {
        summary.name_changed = record.name() != Some(name.as_str());
        record.set_name(name.clone());
    }

    trace!(
        address = record.address(),
        new_uuids = summary.new_uuids,
        manufacturer_updates = summary.manufacturer_updates,
        name_changed = summary.name_changed,
        tx_power_changed = summary.tx_power_changed,
        connectable_changed = summary.connectable_changed,
        "Merged advertisement"
    );
    summary
}
