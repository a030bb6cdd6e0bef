//! Record payload conversions.
//!
//! Writes accept either a string or raw bytes. Strings are tried as standard
//! base64 first and fall back to their UTF-8 bytes, so a literal that happens
//! to be valid base64 (`"test"`, `"abcd"`) is sent decoded.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Data blob as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DataBlob {
    Text(String),
    Bytes(Vec<u8>),
}

impl DataBlob {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            DataBlob::Text(text) => encode_text(&text),
            DataBlob::Bytes(bytes) => bytes,
        }
    }
}

/// Base64 when the text decodes, otherwise the literal UTF-8 bytes.
pub fn encode_text(text: &str) -> Vec<u8> {
    STANDARD
        .decode(text)
        .unwrap_or_else(|_| text.as_bytes().to_vec())
}

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn from_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded)
}

/// Adds `DataString` or `DataBase64` to a record whose `Data` is wire base64.
pub fn annotate_record(record: &mut Map<String, Value>) -> eyre::Result<()> {
    let Some(encoded) = record.get("Data").and_then(Value::as_str) else {
        return Ok(());
    };
    let bytes = from_base64(encoded)
        .map_err(|e| eyre::eyre!("record data is not valid base64: {e}"))?;
    match String::from_utf8(bytes) {
        Ok(text) => {
            record.insert("DataString".to_string(), Value::String(text));
        }
        Err(err) => {
            let encoded = to_base64(err.as_bytes());
            record.insert("DataBase64".to_string(), Value::String(encoded));
        }
    }
    Ok(())
}
