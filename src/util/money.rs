use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A monetary amount.
///
/// Displayed and persisted as a comma-grouped string (`"12,800,000,000"`),
/// summable after stripping the separators. Integer values round-trip
/// through the string form losslessly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Amount(f64);

impl Amount {
    pub fn zero() -> Amount {
        Amount(0.0)
    }

    pub fn new(value: f64) -> Amount {
        Amount(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

/// Insert thousands separators into a plain digit string.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.0 < 0.0;
        let abs = self.0.abs();
        let rendered = if abs.fract() == 0.0 {
            group_digits(&format!("{}", abs as i64))
        } else {
            let text = format!("{}", abs);
            match text.split_once('.') {
                Some((int_part, frac_part)) => {
                    format!("{}.{}", group_digits(int_part), frac_part)
                }
                None => group_digits(&text),
            }
        };
        if negative {
            write!(f, "-{}", rendered)
        } else {
            f.write_str(&rendered)
        }
    }
}

/// Error for unparseable amount strings
#[derive(Debug, thiserror::Error)]
#[error("invalid amount: {0:?}")]
pub struct ParseAmountError(String);

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Amount, ParseAmountError> {
        let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
        if cleaned.is_empty() {
            return Ok(Amount::zero());
        }
        cleaned
            .parse::<f64>()
            .map(Amount)
            .map_err(|_| ParseAmountError(s.to_string()))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a comma-grouped amount string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse().map_err(de::Error::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Ok(Amount(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(v as f64))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount(v as f64))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(Amount::new(0.0).to_string(), "0");
        assert_eq!(Amount::new(999.0).to_string(), "999");
        assert_eq!(Amount::new(1000.0).to_string(), "1,000");
        assert_eq!(Amount::new(480_000_000.0).to_string(), "480,000,000");
        assert_eq!(Amount::new(12_800_000_000.0).to_string(), "12,800,000,000");
    }

    #[test]
    fn test_format_fraction_and_sign() {
        assert_eq!(Amount::new(1234.5).to_string(), "1,234.5");
        assert_eq!(Amount::new(-1000.0).to_string(), "-1,000");
    }

    #[test]
    fn test_parse_strips_separators() {
        assert_eq!("12,800,000,000".parse::<Amount>().unwrap().value(), 12_800_000_000.0);
        assert_eq!("999".parse::<Amount>().unwrap().value(), 999.0);
        assert_eq!("".parse::<Amount>().unwrap().value(), 0.0);
        assert!("12x00".parse::<Amount>().is_err());
    }

    #[test]
    fn test_integer_round_trip_is_lossless() {
        for v in [0i64, 1, 999, 1_000, 123_456_789, 12_800_000_000] {
            let amount = Amount::new(v as f64);
            let back: Amount = amount.to_string().parse().unwrap();
            assert_eq!(back.value(), v as f64);
        }
    }

    #[test]
    fn test_deserialize_string_or_number() {
        let from_str: Amount = serde_json::from_str("\"1,234\"").unwrap();
        assert_eq!(from_str.value(), 1234.0);
        let from_num: Amount = serde_json::from_str("120000000").unwrap();
        assert_eq!(from_num.value(), 120_000_000.0);
        let from_float: Amount = serde_json::from_str("0.5").unwrap();
        assert_eq!(from_float.value(), 0.5);
    }

    #[test]
    fn test_serialize_as_grouped_string() {
        let json = serde_json::to_string(&Amount::new(480_000_000.0)).unwrap();
        assert_eq!(json, "\"480,000,000\"");
    }
}
