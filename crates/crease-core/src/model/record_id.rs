// ── Record identity ──
//
// The backend hands out integer primary keys for most collections and
// string keys (slugs, UUIDs) for a few. `RecordId` covers both and knows
// how to match itself against the id field of an opaque JSON record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a backend record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl RecordId {
    /// Read the id out of `record[field]`, if it is a number or string.
    pub fn of(record: &Value, field: &str) -> Option<Self> {
        match record.get(field)? {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }

    /// Does `record[field]` identify this record?
    ///
    /// Compares canonical string forms, so `1` and `"1"` match.
    pub fn matches(&self, record: &Value, field: &str) -> bool {
        match record.get(field) {
            Some(Value::Number(n)) => n.to_string() == self.to_string(),
            Some(Value::String(s)) => *s == self.to_string(),
            _ => false,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<i64> for RecordId {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

/// Text ids are kept verbatim; `"007"` and `"7"` are different records.
impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_ids_are_kept_verbatim() {
        assert_eq!(RecordId::from("42"), RecordId::Str("42".into()));
        assert_eq!(RecordId::from("007").to_string(), "007");
        assert_eq!("007".parse::<RecordId>(), Ok(RecordId::Str("007".into())));
        assert_eq!(
            RecordId::from("mumbai-indians"),
            RecordId::Str("mumbai-indians".into())
        );
    }

    #[test]
    fn leading_zeros_do_not_match_the_number() {
        let record = json!({"id": 7});
        assert!(!RecordId::from("007").matches(&record, "id"));
        assert!(RecordId::from("007").matches(&json!({"id": "007"}), "id"));
        assert!(!RecordId::Int(7).matches(&json!({"id": "007"}), "id"));
    }

    #[test]
    fn matches_across_number_and_string() {
        let record = json!({"id": 1, "slug": "csk", "uuid": "7"});
        assert!(RecordId::Int(1).matches(&record, "id"));
        assert!(RecordId::from("1").matches(&record, "id"));
        assert!(RecordId::Int(7).matches(&record, "uuid"));
        assert!(RecordId::from("csk").matches(&record, "slug"));
        assert!(!RecordId::Int(2).matches(&record, "id"));
        assert!(!RecordId::Int(1).matches(&record, "missing"));
    }

    #[test]
    fn reads_id_from_record() {
        assert_eq!(RecordId::of(&json!({"id": 5}), "id"), Some(RecordId::Int(5)));
        assert_eq!(RecordId::of(&json!({"id": null}), "id"), None);
    }
}
