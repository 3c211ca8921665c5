//! Body codecs: JSON and form encoding for requests, path-aware JSON decoding
//! for responses.

use bytes::Bytes;

use crate::Result;

/// Content type the client attaches to encoded request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    FormUrlEncoded,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Example
///
/// ```
/// use assay_core::to_json;
///
/// let bytes = to_json(&serde_json::json!({"key": "k"})).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"key":"k"}"#);
/// ```
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a value to form URL-encoded bytes.
///
/// Uses `serde_html_form`, so `Vec<T>` fields and slices of pairs produce
/// repeated keys (e.g., `tags=a&tags=b`).
///
/// # Example
///
/// ```
/// use assay_core::to_form;
///
/// let bytes = to_form(&[("user", "alice"), ("tag", "a b")]).expect("serialize");
/// assert_eq!(bytes.as_ref(), b"user=alice&tag=a+b");
/// ```
pub fn to_form<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_html_form::to_string(value)
        .map(|s| Bytes::from(s.into_bytes()))
        .map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Failures carry the path of the offending field (e.g. `items[2].name`).
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
