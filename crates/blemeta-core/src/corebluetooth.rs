//! CoreBluetooth advertisement decoding (macOS, iOS).
//!
//! CoreBluetooth hands `centralManager:didDiscoverPeripheral:advertisementData:RSSI:`
//! an `NSDictionary` that is only valid inside the callback; lower layers of
//! the stack may mutate it afterwards. The discovery layer copies the
//! dictionary into a [`RawPayload`] and this decoder normalizes it.
//!
//! - `kCBAdvDataServiceUUIDs` / `kCBAdvDataOverflowServiceUUIDs`: `CBUUID`
//!   strings, which CoreBluetooth renders uppercase
//! - `kCBAdvDataManufacturerData`: raw AD bytes, company id first
//! - `kCBAdvDataIsConnectable`: an `NSNumber`, so integers are accepted

use blemeta_types::keys::{
    CB_IS_CONNECTABLE, CB_LOCAL_NAME, CB_MANUFACTURER_DATA, CB_OVERFLOW_SERVICE_UUIDS,
    CB_SERVICE_UUIDS, CB_TX_POWER_LEVEL,
};
use blemeta_types::DecodedAdvertisement;

use crate::decoder::{decode_manufacturer, decode_tx_power, decode_uuids};
use crate::error::Result;
use crate::raw::RawPayload;

/// Decode a CoreBluetooth `advertisementData` dictionary.
pub fn decode(raw: &RawPayload) -> Result<DecodedAdvertisement> {
    let mut uuids = decode_uuids(raw, CB_SERVICE_UUIDS)?;
    uuids.extend(decode_uuids(raw, CB_OVERFLOW_SERVICE_UUIDS)?);

    Ok(DecodedAdvertisement {
        uuids,
        manufacturer: decode_manufacturer(raw, CB_MANUFACTURER_DATA)?,
        extra_manufacturers: Vec::new(),
        local_name: raw.string(CB_LOCAL_NAME)?.map(str::to_string),
        tx_power: decode_tx_power(raw, CB_TX_POWER_LEVEL)?,
        connectable: raw.boolean(CB_IS_CONNECTABLE)?,
    })
}
