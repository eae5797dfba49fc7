//! Advertisement decoding.
//!
//! An [`AdvertisementDecoder`] turns one platform's [`RawPayload`] into a
//! [`DecodedAdvertisement`]. Decoding is a pure transformation: every value
//! is copied into owned storage, and a present field with the wrong shape
//! fails with [`Error::MalformedAdvertisement`] rather than producing
//! partial data.
//!
//! The field helpers in this module hold the rules shared by all platform
//! decoders; the per-stack key names live in [`crate::corebluetooth`],
//! [`crate::bluez`] and [`crate::winrt`].

use blemeta_types::{normalize_uuid, DecodedAdvertisement, ManufacturerData};

use crate::error::{Error, Result};
use crate::raw::RawPayload;

/// Trait for decoding a platform-specific advertisement payload.
///
/// Any `Fn(&RawPayload) -> Result<DecodedAdvertisement>` that is
/// `Send + Sync` implements this trait, so plain functions can be
/// registered directly.
///
/// # Example
///
/// ```
/// use blemeta_core::{AdvertisementDecoder, RawPayload, Result};
/// use blemeta_core::types::DecodedAdvertisement;
///
/// fn decode_nothing(_raw: &RawPayload) -> Result<DecodedAdvertisement> {
///     Ok(DecodedAdvertisement::new())
/// }
///
/// let decoded = decode_nothing.decode(&RawPayload::new()).unwrap();
/// assert!(decoded.is_empty());
/// ```
pub trait AdvertisementDecoder: Send + Sync {
    /// Decode a raw payload into normalized fields.
    fn decode(&self, raw: &RawPayload) -> Result<DecodedAdvertisement>;
}

impl<F> AdvertisementDecoder for F
where
    F: Fn(&RawPayload) -> Result<DecodedAdvertisement> + Send + Sync,
{
    fn decode(&self, raw: &RawPayload) -> Result<DecodedAdvertisement> {
        self(raw)
    }
}

/// Read a UUID list, lowercasing each entry.
///
/// Absent or empty lists yield an empty vector.
pub fn decode_uuids(raw: &RawPayload, key: &str) -> Result<Vec<String>> {
    Ok(raw
        .string_list(key)?
        .unwrap_or_default()
        .iter()
        .map(|u| normalize_uuid(u))
        .collect())
}

/// Read manufacturer data stored in BLE wire order (company id first).
///
/// Absent or empty buffers yield `None`; buffers shorter than the 2-byte
/// company id are malformed.
pub fn decode_manufacturer(raw: &RawPayload, key: &str) -> Result<Option<ManufacturerData>> {
    match raw.bytes(key)? {
        None | Some([]) => Ok(None),
        Some(bytes) => ManufacturerData::from_prefixed(bytes)
            .map(Some)
            .map_err(|e| match Error::from(e) {
                Error::MalformedAdvertisement { reason, .. } => Error::malformed(key, reason),
                other => other,
            }),
    }
}

/// Read a transmit power level, rejecting values outside the `i16` range.
pub fn decode_tx_power(raw: &RawPayload, key: &str) -> Result<Option<i16>> {
    raw.int(key)?
        .map(|v| {
            i16::try_from(v)
                .map_err(|_| Error::malformed(key, format!("tx power {} out of range", v)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_uuids_lowercases() {
        let raw = RawPayload::new().with("u", vec!["ABCD-1234", "abcd-1234"]);
        assert_eq!(decode_uuids(&raw, "u").unwrap(), vec!["abcd-1234", "abcd-1234"]);
    }

    #[test]
    fn test_decode_uuids_absent_or_empty() {
        let raw = RawPayload::new().with("u", Vec::<String>::new());
        assert!(decode_uuids(&raw, "u").unwrap().is_empty());
        assert!(decode_uuids(&raw, "missing").unwrap().is_empty());
    }

    #[test]
    fn test_decode_manufacturer() {
        let raw = RawPayload::new().with("m", vec![0x4Cu8, 0x00, 0x02, 0x15, 0x01]);
        let mfg = decode_manufacturer(&raw, "m").unwrap().unwrap();
        assert_eq!(mfg.id, 76);
        assert_eq!(mfg.data, vec![0x02, 0x15, 0x01]);
    }

    #[test]
    fn test_decode_manufacturer_empty_is_absent() {
        let raw = RawPayload::new().with("m", Vec::<u8>::new());
        assert_eq!(decode_manufacturer(&raw, "m").unwrap(), None);
        assert_eq!(decode_manufacturer(&raw, "missing").unwrap(), None);
    }

    #[test]
    fn test_decode_manufacturer_short_names_key() {
        let raw = RawPayload::new().with("m", vec![0x4Cu8]);
        match decode_manufacturer(&raw, "m").unwrap_err() {
            Error::MalformedAdvertisement { field, reason } => {
                assert_eq!(field, "m");
                assert!(reason.contains("got 1"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_tx_power_range() {
        let raw = RawPayload::new().with("ok", -20i64).with("big", 70_000i64);
        assert_eq!(decode_tx_power(&raw, "ok").unwrap(), Some(-20));
        assert!(decode_tx_power(&raw, "big").is_err());
        assert_eq!(decode_tx_power(&raw, "missing").unwrap(), None);
    }

    #[test]
    fn test_closure_is_decoder() {
        let decoder = |_: &RawPayload| -> Result<DecodedAdvertisement> {
            Ok(DecodedAdvertisement::new().with_local_name("x"))
        };
        let decoded = decoder.decode(&RawPayload::new()).unwrap();
        assert_eq!(decoded.local_name.as_deref(), Some("x"));
    }
}
