//! Decode helpers for Redfish property quirks.

use serde::{Deserialize, Deserializer};

/// Decode an explicit `null` as `T::default()`.
///
/// Services send `null` for properties they cannot populate. Pair it with
/// `#[serde(default)]` so an absent property decodes the same way:
///
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Port {
///     #[serde(default, deserialize_with = "redfish_common::de::null_as_default")]
///     speed: u32,
/// }
///
/// let port: Port = serde_json::from_str(r#"{"speed": null}"#).unwrap();
/// assert_eq!(port.speed, 0);
/// ```
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "null_as_default")]
        count: i64,
        #[serde(default, deserialize_with = "null_as_default")]
        label: String,
    }

    #[test]
    fn null_and_absent_are_default() {
        let sample: Sample = serde_json::from_str(r#"{"count": null}"#).unwrap();
        assert_eq!(sample.count, 0);
        assert_eq!(sample.label, "");
    }

    #[test]
    fn present_values_are_kept() {
        let sample: Sample = serde_json::from_str(r#"{"count": 3, "label": "x"}"#).unwrap();
        assert_eq!(sample.count, 3);
        assert_eq!(sample.label, "x");
    }

    #[test]
    fn wrong_type_still_fails() {
        assert!(serde_json::from_str::<Sample>(r#"{"count": "three"}"#).is_err());
    }
}
