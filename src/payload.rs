//! Payload types carried by buffers.
//!
//! Payload shape is an explicit tagged variant with fixed cases, so
//! consumers match on the variant instead of probing types at each
//! element boundary.

use bytes::Bytes;
use indexmap::IndexMap;

/// Data carried by a single push through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw byte blob.
    Bytes(Bytes),
    /// Reference to an external resource, not yet read.
    Uri(String),
    /// Decoded text.
    Text(String),
    /// Open key/value record of named payload fields.
    Record(Record),
}

impl Payload {
    /// Short tag naming the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bytes(_) => "bytes",
            Self::Uri(_) => "uri",
            Self::Text(_) => "text",
            Self::Record(_) => "record",
        }
    }

    /// Approximate size in bytes of the carried data.
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Bytes(data) => data.len(),
            Self::Uri(uri) => uri.len(),
            Self::Text(text) => text.len(),
            Self::Record(record) => record.iter().map(|(_, v)| v.byte_len()).sum(),
        }
    }

    /// Get the bytes, if this is a `Bytes` payload.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(data) => Some(data),
            _ => None,
        }
    }

    /// Get the text, if this is a `Text` payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the record, if this is a `Record` payload.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// An ordered record of named payload fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, Payload>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (builder style).
    pub fn with(mut self, key: impl Into<String>, value: Payload) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Insert a field, replacing any existing value under the key.
    pub fn insert(&mut self, key: impl Into<String>, value: Payload) {
        self.fields.insert(key.into(), value);
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.fields.get(key)
    }

    /// Look up a text field.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Payload::as_text)
    }

    /// Look up a bytes field.
    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        self.get(key).and_then(Payload::as_bytes)
    }

    /// Iterate over the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Payload)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_fields() {
        let record = Record::new()
            .with("uri", Payload::Uri("file:///tmp/a.pdf".into()))
            .with("data", Payload::Bytes(Bytes::from_static(b"%PDF-1.4")));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get_bytes("data"), Some(&b"%PDF-1.4"[..]));
        assert!(record.get_text("data").is_none());
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn test_byte_len_sums_record_fields() {
        let payload = Payload::Record(
            Record::new()
                .with("a", Payload::Text("abc".into()))
                .with("b", Payload::Bytes(Bytes::from_static(&[0u8; 5]))),
        );
        assert_eq!(payload.byte_len(), 8);
        assert_eq!(payload.kind(), "record");
    }
}
