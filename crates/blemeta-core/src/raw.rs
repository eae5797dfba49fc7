//! Raw platform advertisement payloads.
//!
//! The discovery layer copies whatever its native stack hands over
//! (an `NSDictionary`, a D-Bus `a{sv}`, WinRT section lists) into a
//! [`RawPayload`] before the callback returns. Some stacks reuse or
//! invalidate that memory once the callback is done, so payloads always
//! own their bytes.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// A single value from a platform advertisement dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Raw byte buffer.
    Bytes(Vec<u8>),
    /// String value.
    Str(String),
    /// List of strings (e.g. service UUIDs).
    StrList(Vec<String>),
    /// Integer value.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// Manufacturer payloads already split by company identifier.
    CompanyMap(BTreeMap<u16, Vec<u8>>),
}

impl RawValue {
    /// Short name of the value's shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Bytes(_) => "bytes",
            RawValue::Str(_) => "string",
            RawValue::StrList(_) => "string list",
            RawValue::Int(_) => "integer",
            RawValue::Bool(_) => "boolean",
            RawValue::CompanyMap(_) => "company map",
        }
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(v: Vec<u8>) -> Self {
        RawValue::Bytes(v)
    }
}

impl From<&[u8]> for RawValue {
    fn from(v: &[u8]) -> Self {
        RawValue::Bytes(v.to_vec())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Str(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Str(v.to_string())
    }
}

impl From<Vec<String>> for RawValue {
    fn from(v: Vec<String>) -> Self {
        RawValue::StrList(v)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(v: Vec<&str>) -> Self {
        RawValue::StrList(v.into_iter().map(str::to_string).collect())
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<BTreeMap<u16, Vec<u8>>> for RawValue {
    fn from(v: BTreeMap<u16, Vec<u8>>) -> Self {
        RawValue::CompanyMap(v)
    }
}

/// Owned advertisement payload keyed by platform field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPayload {
    fields: BTreeMap<String, RawValue>,
}

impl RawPayload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Look up a field by platform key.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the payload has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Byte buffer under `key`.
    pub fn bytes(&self, key: &str) -> Result<Option<&[u8]>> {
        match self.get(key) {
            None => Ok(None),
            Some(RawValue::Bytes(b)) => Ok(Some(b)),
            Some(other) => Err(mismatch(key, "bytes", other)),
        }
    }

    /// String under `key`.
    pub fn string(&self, key: &str) -> Result<Option<&str>> {
        match self.get(key) {
            None => Ok(None),
            Some(RawValue::Str(s)) => Ok(Some(s)),
            Some(other) => Err(mismatch(key, "string", other)),
        }
    }

    /// String list under `key`.
    pub fn string_list(&self, key: &str) -> Result<Option<&[String]>> {
        match self.get(key) {
            None => Ok(None),
            Some(RawValue::StrList(list)) => Ok(Some(list)),
            Some(other) => Err(mismatch(key, "string list", other)),
        }
    }

    /// Integer under `key`.
    pub fn int(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(RawValue::Int(v)) => Ok(Some(*v)),
            Some(other) => Err(mismatch(key, "integer", other)),
        }
    }

    /// Boolean under `key`. `NSNumber`-style integers are accepted, non-zero is true.
    pub fn boolean(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(RawValue::Bool(v)) => Ok(Some(*v)),
            Some(RawValue::Int(v)) => Ok(Some(*v != 0)),
            Some(other) => Err(mismatch(key, "boolean", other)),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RawPayload
where
    K: Into<String>,
    V: Into<RawValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = RawPayload::new();
        for (key, value) in iter {
            payload.insert(key, value);
        }
        payload
    }
}

fn mismatch(key: &str, expected: &str, actual: &RawValue) -> Error {
    Error::malformed(key, format!("expected {}, got {}", expected, actual.kind()))
}
