//! Native BLE stack identification.
//!
//! Each operating system delivers advertisement data through its own stack,
//! with its own field names and value encodings:
//!
//! | Platform | BLE Stack | Payload shape | Device ID Format |
//! |----------|-----------|---------------|------------------|
//! | macOS/iOS | CoreBluetooth | `advertisementData` dictionary | UUID |
//! | Linux | BlueZ | `org.bluez.Device1` D-Bus properties | MAC Address |
//! | Windows | WinRT | `BluetoothLEAdvertisement` fields | MAC Address |
//!
//! A [`Platform`] tag selects the matching decoder in the
//! [`DecoderRegistry`](crate::DecoderRegistry).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Platform BLE stack tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS or iOS with CoreBluetooth.
    CoreBluetooth,
    /// Linux with BlueZ.
    BlueZ,
    /// Windows with WinRT.
    WinRt,
}

impl Platform {
    /// Every supported platform, in declaration order.
    pub const ALL: [Platform; 3] = [Platform::CoreBluetooth, Platform::BlueZ, Platform::WinRt];

    /// Detect the stack for the current target, if it is supported.
    pub fn current() -> Option<Self> {
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        {
            Some(Platform::CoreBluetooth)
        }
        #[cfg(target_os = "linux")]
        {
            Some(Platform::BlueZ)
        }
        #[cfg(target_os = "windows")]
        {
            Some(Platform::WinRt)
        }
        #[cfg(not(any(
            target_os = "macos",
            target_os = "ios",
            target_os = "linux",
            target_os = "windows"
        )))]
        {
            None
        }
    }

    /// Stable lowercase name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::CoreBluetooth => "corebluetooth",
            Platform::BlueZ => "bluez",
            Platform::WinRt => "winrt",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| Error::unsupported_platform(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_str() {
        assert_eq!("corebluetooth".parse::<Platform>().unwrap(), Platform::CoreBluetooth);
        assert_eq!("BlueZ".parse::<Platform>().unwrap(), Platform::BlueZ);
        assert_eq!(" WINRT ".parse::<Platform>().unwrap(), Platform::WinRt);
    }

    #[test]
    fn test_platform_from_str_unknown() {
        let err = "android".parse::<Platform>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform(ref p) if p == "android"));
    }

    #[test]
    fn test_platform_display_roundtrips() {
        for platform in Platform::ALL {
            assert_eq!(platform.to_string().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn test_platform_serde_names() {
        let json = serde_json::to_string(&Platform::WinRt).unwrap();
        assert_eq!(json, "\"winrt\"");
        let parsed: Platform = serde_json::from_str("\"bluez\"").unwrap();
        assert_eq!(parsed, Platform::BlueZ);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_current_platform_linux() {
        assert_eq!(Platform::current(), Some(Platform::BlueZ));
    }
}
