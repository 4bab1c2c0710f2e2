//! Base record fields and the paginated list envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Fields every server record carries.
///
/// Records embed this with `#[serde(flatten)]`, so on the wire `id`,
/// `created` and `modified` sit next to the record's own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model<Id> {
    /// Primary key.
    pub id: Id,

    /// When the record was created.
    pub created: DateTime<Utc>,

    /// When the record was last modified.
    pub modified: DateTime<Utc>,
}

impl<Id> Model<Id> {
    /// Create base fields with both timestamps set to `at`.
    pub fn new(id: Id, at: DateTime<Utc>) -> Self {
        Self {
            id,
            created: at,
            modified: at,
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Total number of records across all pages.
    pub count: u64,

    /// Link to the next page. `null` and `""` both decode to `None`.
    #[serde(deserialize_with = "empty_link")]
    pub next: Option<String>,

    /// Link to the previous page. `null` and `""` both decode to `None`.
    #[serde(deserialize_with = "empty_link")]
    pub previous: Option<String>,

    /// Records on this page, in server order.
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// A single page holding every record.
    pub fn single(results: Vec<T>) -> Self {
        Self {
            count: results.len() as u64,
            next: None,
            previous: None,
            results,
        }
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Number of records on this page.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Paging parameters that fetch the next page, read from the `next` link.
    pub fn next_page(&self) -> Option<PageRequest> {
        self.next.as_deref().map(PageRequest::from_link)
    }

    /// Transform the records while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

fn empty_link<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let link = Option::<String>::deserialize(deserializer)?;
    Ok(link.filter(|s| !s.is_empty()))
}

/// Limit/offset paging parameters accepted by every list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl PageRequest {
    /// First page of `limit` records.
    pub fn first(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    /// Read `limit` and `offset` from the query string of a page link.
    ///
    /// Parameters that are missing or not integers are left unset.
    pub fn from_link(link: &str) -> Self {
        let query = link
            .split_once('?')
            .map(|(_, q)| q)
            .unwrap_or("")
            .split('#')
            .next()
            .unwrap_or("");

        let mut page = Self::default();
        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "limit" => page.limit = value.parse().ok(),
                "offset" => page.offset = value.parse().ok(),
                _ => {}
            }
        }
        page
    }
}
