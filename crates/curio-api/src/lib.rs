use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod client;
pub mod config;
pub mod facets;
pub mod tui;

pub use client::{Lookup, LookupError, QueryClient};
pub use config::ApiConfig;

/// Pagination metadata returned alongside every page of records.
///
/// The upstream API carries absolute URLs for the adjacent pages; they are
/// treated as opaque tokens and followed verbatim by [`QueryClient::page`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub totalrecords: Option<i64>,
    #[serde(default)]
    pub totalrecordsperquery: Option<i64>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub pages: Option<i64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

/// One page of results: pagination metadata plus the records for that page,
/// in the order the API returned them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultEnvelope {
    #[serde(default)]
    pub info: PageInfo,
    #[serde(default)]
    pub records: Vec<Record>,
}

/// A person credited on a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub displayname: Option<String>,
    #[serde(default)]
    pub alphasort: Option<String>,
    #[serde(default)]
    pub displaydate: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// An image attached to a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub baseimageurl: Option<String>,
    #[serde(default)]
    pub alttext: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
}

/// A collection record. Only the fields the UI renders are modeled as typed
/// fields; everything else the API sends is preserved in `extra`, so the
/// record stays an opaque mapping beyond what we display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub dated: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub technique: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub dimensions: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub creditline: Option<String>,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Record {
    /// Title shown in lists and headers; records without one get a stand-in.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_decodes_empty_info_and_records() {
        let env: ResultEnvelope = serde_json::from_str(r#"{"info":{},"records":[]}"#).unwrap();
        assert!(env.records.is_empty());
        assert!(env.info.next.is_none());
        assert!(env.info.totalrecords.is_none());
    }

    #[test]
    fn envelope_decodes_full_record() {
        let body = r#"{
            "info": {"totalrecords": 3, "page": 1, "next": "https://api.example.org/object?page=2"},
            "records": [{
                "id": 42,
                "title": "Self-Portrait",
                "dated": "1660",
                "culture": "Dutch",
                "medium": "Oil on canvas",
                "people": [{"displayname": "Rembrandt van Rijn", "displaydate": "1606-1669"}],
                "images": [{"baseimageurl": "https://img.example.org/42.jpg", "alttext": "A self portrait"}],
                "objectnumber": "1936.93"
            }]
        }"#;
        let env: ResultEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(env.info.totalrecords, Some(3));
        assert_eq!(env.info.next.as_deref(), Some("https://api.example.org/object?page=2"));
        let rec = &env.records[0];
        assert_eq!(rec.display_title(), "Self-Portrait");
        assert_eq!(rec.culture.as_deref(), Some("Dutch"));
        assert_eq!(rec.people.len(), 1);
        assert_eq!(rec.people[0].displayname.as_deref(), Some("Rembrandt van Rijn"));
        // Unmodeled fields survive in the extras map.
        assert_eq!(
            rec.extra.get("objectnumber").and_then(|v| v.as_str()),
            Some("1936.93")
        );
    }

    #[test]
    fn record_round_trips_through_json() {
        let rec = Record {
            title: Some("Vase".into()),
            culture: Some("Greek".into()),
            ..Default::default()
        };
        let text = serde_json::to_string(&rec).unwrap();
        let back: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(back.title.as_deref(), Some("Vase"));
        assert_eq!(back.culture.as_deref(), Some("Greek"));
    }
}
