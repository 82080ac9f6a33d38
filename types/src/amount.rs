//! Token amounts on self-describing wire formats.
//!
//! Amounts are `u128`, but serde cannot buffer a `u128` for tagged or
//! flattened enums. Wire fields therefore go through [`deserialize_amount`],
//! which takes an unsigned integer or a decimal string and widens it.

use serde::de::{self, Deserializer, Visitor};
use std::fmt;

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = u128;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer or a decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
        Ok(u128::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
        u128::try_from(v).map_err(|_| E::custom(format!("negative amount {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
        v.parse::<u128>()
            .map_err(|_| E::custom(format!("invalid amount {:?}", v)))
    }
}

/// `deserialize_with` target for `u128` amount fields.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(AmountVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(tag = "kind")]
    enum Tagged {
        Amount {
            #[serde(deserialize_with = "deserialize_amount")]
            value: u128,
        },
    }

    fn parse(json: &str) -> Result<u128, serde_json::Error> {
        serde_json::from_str::<Tagged>(json).map(|Tagged::Amount { value }| value)
    }

    #[test]
    fn integers_widen_inside_tagged_enums() {
        assert_eq!(parse(r#"{"kind":"Amount","value":5}"#).unwrap(), 5);
        assert_eq!(
            parse(r#"{"kind":"Amount","value":18446744073709551615}"#).unwrap(),
            u128::from(u64::MAX)
        );
    }

    #[test]
    fn decimal_strings_cover_the_full_range() {
        assert_eq!(
            parse(&format!(r#"{{"kind":"Amount","value":"{}"}}"#, u128::MAX)).unwrap(),
            u128::MAX
        );
    }

    #[test]
    fn rejects_negative_fractional_and_garbage() {
        assert!(parse(r#"{"kind":"Amount","value":-1}"#).is_err());
        assert!(parse(r#"{"kind":"Amount","value":1.5}"#).is_err());
        assert!(parse(r#"{"kind":"Amount","value":"12abc"}"#).is_err());
    }
}
