// Helper functions for safe logging and wire-format coercion

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// use talktolead_dashboard::common::safe_email_log;
/// assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        match (parts.as_slice(), parts[0].chars().next()) {
            ([_, domain], Some(first)) => format!("{}***@{}", first, domain),
            _ => "***@***.***".to_string(),
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
///
/// # Example
/// ```
/// use talktolead_dashboard::common::safe_token_log;
/// assert_eq!(safe_token_log("eyJhbGciOiJIUzI1NiJ9"), "eyJh...NiJ9");
/// ```
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 && token.is_ascii() {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Returns the value only when it is present and not empty
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Deserializes an identifier the backend may emit as a number or a string
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or numeric id, got {}",
            other
        ))),
    }
}

/// Optional variant of [`deserialize_id`]; `null` maps to `None`
pub fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or numeric id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "deserialize_id")]
        id: String,
        #[serde(default, deserialize_with = "deserialize_opt_id")]
        parent_id: Option<String>,
    }

    #[test]
    fn test_ids_are_coerced_to_strings() {
        let row: Row = serde_json::from_str(r#"{"id": 42, "parent_id": "p-7"}"#).unwrap();
        assert_eq!(row.id, "42");
        assert_eq!(row.parent_id.as_deref(), Some("p-7"));

        let row: Row = serde_json::from_str(r#"{"id": "abc", "parent_id": null}"#).unwrap();
        assert_eq!(row.id, "abc");
        assert_eq!(row.parent_id, None);

        let row: Row = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(row.parent_id, None);
    }

    #[test]
    fn test_missing_or_invalid_id_is_rejected() {
        assert!(serde_json::from_str::<Row>(r#"{}"#).is_err());
        assert!(serde_json::from_str::<Row>(r#"{"id": true}"#).is_err());
    }

    #[test]
    fn test_masking() {
        assert_eq!(safe_email_log("jane@x.com"), "j***@x.com");
        assert_eq!(safe_email_log("a@b"), "***@***.***");
        assert_eq!(safe_token_log("short"), "***");
        assert_eq!(safe_token_log("demo_token_123"), "demo..._123");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("x")), Some("x"));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
    }
}
