//! Conversions between domain values and nullable storage columns.
//!
//! Bind-side helpers turn "not supplied" into SQL `NULL`; read-side helpers
//! turn `NULL` back into absence, or into a fallback for columns whose default
//! lives in the store. Identifier columns are decoded by sqlx itself and a
//! malformed value surfaces as [`ShipmanError::DecodingFault`](crate::errors::ShipmanError).

use serde_json::Value;

/// Absent values bind as `NULL`.
pub fn encode_optional<T>(value: &Option<T>) -> Option<&T> {
    value.as_ref()
}

/// Bind a defaulted column. An empty string binds as `NULL`, so the insert's
/// `COALESCE` applies the store default.
pub fn encode_defaulted(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Empty blobs are stored as `NULL`.
pub fn encode_bytes(value: &Option<Vec<u8>>) -> Option<&[u8]> {
    value.as_deref().filter(|b| !b.is_empty())
}

/// A JSON `null` document is stored as SQL `NULL`.
pub fn encode_document(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

pub fn decode_optional<T>(raw: Option<T>) -> Option<T> {
    raw
}

/// `NULL` reads back as `fallback`.
pub fn decode_with_default(raw: Option<String>, fallback: &str) -> String {
    raw.unwrap_or_else(|| fallback.to_string())
}

/// Empty or `NULL` blobs read back as absent. The row buffer is owned by the
/// caller once decoded, nothing aliases the driver's storage.
pub fn decode_bytes(raw: Option<Vec<u8>>) -> Option<Vec<u8>> {
    raw.filter(|b| !b.is_empty())
}

/// `NULL` and JSON `null` both read back as absent.
pub fn decode_document(raw: Option<Value>) -> Option<Value> {
    raw.filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn optional_round_trip() {
        let absent: Option<String> = None;
        assert_eq!(decode_optional(encode_optional(&absent).cloned()), None);

        let present = Some("Rotterdam".to_string());
        assert_eq!(
            decode_optional(encode_optional(&present).cloned()),
            Some("Rotterdam".to_string())
        );

        let when = Some(Utc.with_ymd_and_hms(2024, 3, 1, 6, 30, 0).unwrap());
        assert_eq!(decode_optional(encode_optional(&when).copied()), when);

        let year: Option<i16> = Some(2011);
        assert_eq!(decode_optional(encode_optional(&year).copied()), year);

        let draft: Option<f64> = Some(11.4);
        assert_eq!(decode_optional(encode_optional(&draft).copied()), draft);
    }

    #[test]
    fn empty_default_binds_null() {
        assert_eq!(encode_defaulted(""), None);
        assert_eq!(encode_defaulted("active"), Some("active"));
    }

    #[test]
    fn null_reads_back_fallback() {
        assert_eq!(decode_with_default(None, "draft"), "draft");
        assert_eq!(
            decode_with_default(Some("active".to_string()), "draft"),
            "active"
        );
    }

    #[test]
    fn empty_blob_is_absent() {
        assert_eq!(encode_bytes(&Some(Vec::new())), None);
        assert_eq!(encode_bytes(&None), None);
        assert_eq!(encode_bytes(&Some(vec![0xde, 0xad])), Some(&[0xde, 0xad][..]));

        assert_eq!(decode_bytes(Some(Vec::new())), None);
        assert_eq!(decode_bytes(None), None);
        assert_eq!(decode_bytes(Some(vec![7, 8])), Some(vec![7, 8]));
    }

    #[test]
    fn null_document_is_absent() {
        assert_eq!(encode_document(&Some(Value::Null)), None);
        assert_eq!(decode_document(Some(Value::Null)), None);

        let plan = Some(json!({"hold_1": "wheat"}));
        assert_eq!(decode_document(encode_document(&plan).cloned()), plan);
    }
}
