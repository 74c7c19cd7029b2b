// List response normalization.
//
// The backend answers list endpoints either with a paginated envelope
// (`{ "results": [...], "count": N, "next": ..., "previous": ... }`) or
// with a bare JSON array. `Page<T>` is the one shape callers see.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// A normalized list response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total on the server; equals `items.len()` for bare arrays.
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawList<T> {
    Bare(Vec<T>),
    Envelope {
        #[serde(alias = "data")]
        results: Vec<T>,
        #[serde(default, alias = "total")]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
    },
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            next: None,
            previous: None,
        }
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Normalize a decoded response body. `null` (e.g. a 204) is an empty page.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        if value.is_null() {
            return Ok(Self::default());
        }

        let raw: RawList<T> =
            serde_json::from_value(value.clone()).map_err(|e| Error::Deserialization {
                message: format!("unrecognized list response: {e}"),
                body: value.to_string(),
            })?;

        Ok(match raw {
            RawList::Bare(items) => Self {
                count: len_u64(&items),
                items,
                next: None,
                previous: None,
            },
            RawList::Envelope {
                results,
                count,
                next,
                previous,
            } => Self {
                count: count.unwrap_or_else(|| len_u64(&results)),
                items: results,
                next,
                previous,
            },
        })
    }
}

fn len_u64<T>(items: &[T]) -> u64 {
    u64::try_from(items.len()).unwrap_or(u64::MAX)
}
