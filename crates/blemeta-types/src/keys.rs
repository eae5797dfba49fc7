//! Well-known advertisement keys and company identifiers.
//!
//! Platform BLE stacks expose advertisement data under their own key
//! names. The decoders in blemeta-core look fields up by these constants.

// --- CoreBluetooth advertisement data keys ---

/// Advertised service UUIDs.
pub const CB_SERVICE_UUIDS: &str = "kCBAdvDataServiceUUIDs";

/// Service UUIDs found in the overflow area of the advertisement.
pub const CB_OVERFLOW_SERVICE_UUIDS: &str = "kCBAdvDataOverflowServiceUUIDs";

/// Manufacturer data, including the 16-bit company identifier prefix.
pub const CB_MANUFACTURER_DATA: &str = "kCBAdvDataManufacturerData";

/// Local name of the peripheral.
pub const CB_LOCAL_NAME: &str = "kCBAdvDataLocalName";

/// Transmit power level.
pub const CB_TX_POWER_LEVEL: &str = "kCBAdvDataTxPowerLevel";

/// Whether the advertising event type is connectable.
pub const CB_IS_CONNECTABLE: &str = "kCBAdvDataIsConnectable";

// --- BlueZ org.bluez.Device1 properties ---

/// Service UUIDs known for the device.
pub const BLUEZ_UUIDS: &str = "UUIDs";

/// Manufacturer data keyed by company identifier.
pub const BLUEZ_MANUFACTURER_DATA: &str = "ManufacturerData";

/// Remote device name.
pub const BLUEZ_NAME: &str = "Name";

/// Name alias, used when no name was advertised.
pub const BLUEZ_ALIAS: &str = "Alias";

/// Advertised transmit power level.
pub const BLUEZ_TX_POWER: &str = "TxPower";

// --- WinRT BluetoothLEAdvertisement fields ---

/// Advertised service UUIDs.
pub const WINRT_SERVICE_UUIDS: &str = "ServiceUuids";

/// Manufacturer data section, company identifier first.
pub const WINRT_MANUFACTURER_DATA: &str = "ManufacturerData";

/// Local name of the advertiser.
pub const WINRT_LOCAL_NAME: &str = "LocalName";

/// Transmit power level in dBm.
pub const WINRT_TX_POWER: &str = "TransmitPowerLevelInDBm";

/// Whether the advertisement is connectable.
pub const WINRT_IS_CONNECTABLE: &str = "IsConnectable";

// --- Bluetooth SIG company identifiers ---

/// Apple, Inc.
pub const COMPANY_APPLE: u16 = 0x004C;

/// Microsoft.
pub const COMPANY_MICROSOFT: u16 = 0x0006;

/// Nordic Semiconductor ASA.
pub const COMPANY_NORDIC: u16 = 0x0059;
