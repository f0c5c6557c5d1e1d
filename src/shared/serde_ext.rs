use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts `"1.5"`, `1.5` or `null`; amounts stay textual so no precision is lost
/// before the normalizer scales them.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => Ok(Some(raw)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number, got `{other}`"
        ))),
    }
}
