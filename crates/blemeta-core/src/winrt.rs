//! WinRT advertisement decoding (Windows).
//!
//! `BluetoothLEAdvertisementReceivedEventArgs` exposes the advertisement
//! through typed properties. Manufacturer sections are copied out of the
//! `IBuffer` in wire order, company id first, before the event handler
//! returns. WinRT reports an empty `LocalName` when none was advertised.

use blemeta_types::keys::{
    WINRT_IS_CONNECTABLE, WINRT_LOCAL_NAME, WINRT_MANUFACTURER_DATA, WINRT_SERVICE_UUIDS,
    WINRT_TX_POWER,
};
use blemeta_types::DecodedAdvertisement;

use crate::decoder::{decode_manufacturer, decode_tx_power, decode_uuids};
use crate::error::Result;
use crate::raw::RawPayload;

/// Decode a WinRT advertisement.
pub fn decode(raw: &RawPayload) -> Result<DecodedAdvertisement> {
    Ok(DecodedAdvertisement {
        uuids: decode_uuids(raw, WINRT_SERVICE_UUIDS)?,
        manufacturer: decode_manufacturer(raw, WINRT_MANUFACTURER_DATA)?,
        extra_manufacturers: Vec::new(),
        local_name: raw
            .string(WINRT_LOCAL_NAME)?
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        tx_power: decode_tx_power(raw, WINRT_TX_POWER)?,
        connectable: raw.boolean(WINRT_IS_CONNECTABLE)?,
    })
}
