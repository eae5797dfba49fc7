//! Conversion from btleplug peripheral properties.
//!
//! btleplug already abstracts CoreBluetooth, BlueZ and WinRT behind
//! [`PeripheralProperties`], with manufacturer data split by company id.
//! Applications that scan through btleplug can feed those properties
//! straight into the merge step without going through a [`RawPayload`](crate::RawPayload).

use btleplug::api::PeripheralProperties;
use uuid::Uuid;

use blemeta_types::{normalize_uuid, DecodedAdvertisement};

/// Address btleplug reports on platforms that hide the MAC (macOS).
const HIDDEN_ADDRESS: &str = "00:00:00:00:00:00";

/// Build a [`DecodedAdvertisement`] from btleplug properties.
///
/// All data is cloned out of `props`.
pub fn decode_properties(props: &PeripheralProperties) -> DecodedAdvertisement {
    let mut decoded = DecodedAdvertisement {
        uuids: props.services.iter().map(service_uuid).collect(),
        local_name: props.local_name.clone(),
        tx_power: props.tx_power_level,
        ..Default::default()
    };
    decoded.set_manufacturer_map(&props.manufacturer_data);
    decoded
}

/// The Bluetooth address from `props`, or `None` when the stack hides it.
///
/// On macOS the address is all zeros and callers should key devices by the
/// peripheral id instead.
pub fn properties_address(props: &PeripheralProperties) -> Option<String> {
    let address = props.address.to_string();
    if address == HIDDEN_ADDRESS {
        None
    } else {
        Some(address)
    }
}

fn service_uuid(uuid: &Uuid) -> String {
    normalize_uuid(&uuid.to_string())
}
