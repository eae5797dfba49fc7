//! BlueZ advertisement decoding (Linux).
//!
//! BlueZ reports advertisement data as `org.bluez.Device1` D-Bus properties,
//! either in `InterfacesAdded` or in later `PropertiesChanged` signals.
//! `ManufacturerData` arrives as an `a{qv}` dictionary already split by
//! company id; some bridges flatten it back to wire-order bytes, so both
//! shapes are accepted. BlueZ does not expose a connectable flag.

use blemeta_types::keys::{
    BLUEZ_ALIAS, BLUEZ_MANUFACTURER_DATA, BLUEZ_NAME, BLUEZ_TX_POWER, BLUEZ_UUIDS,
};
use blemeta_types::DecodedAdvertisement;

use crate::decoder::{decode_manufacturer, decode_tx_power, decode_uuids};
use crate::error::Result;
use crate::raw::{RawPayload, RawValue};

/// Decode a set of `org.bluez.Device1` properties.
pub fn decode(raw: &RawPayload) -> Result<DecodedAdvertisement> {
    let mut decoded = DecodedAdvertisement {
        uuids: decode_uuids(raw, BLUEZ_UUIDS)?,
        local_name: local_name(raw)?,
        tx_power: decode_tx_power(raw, BLUEZ_TX_POWER)?,
        ..Default::default()
    };

    match raw.get(BLUEZ_MANUFACTURER_DATA) {
        Some(RawValue::CompanyMap(map)) => decoded.set_manufacturer_map(map),
        _ => decoded.manufacturer = decode_manufacturer(raw, BLUEZ_MANUFACTURER_DATA)?,
    }

    Ok(decoded)
}

/// `Name` is the advertised name; `Alias` only stands in when it is missing.
fn local_name(raw: &RawPayload) -> Result<Option<String>> {
    match raw.string(BLUEZ_NAME)? {
        Some(name) => Ok(Some(name.to_string())),
        None => Ok(raw.string(BLUEZ_ALIAS)?.map(str::to_string)),
    }
}
