//! Response types of the asset API

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by `initSession`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitSessionResponse {
    pub session_token: String,
}

/// One page of a `search/<itemtype>` query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total number of matching items across all pages
    #[serde(default)]
    pub totalcount: u64,
    /// Number of items in this page
    #[serde(default)]
    pub count: u64,
    /// Absent when the search matched nothing
    #[serde(default)]
    pub data: Vec<ComputerRow>,
}

/// A computer row, keyed by search-option id
///
/// The API returns every displayed column under its numeric search-option
/// id (`"1"` for the name, `"2"` for the id, ...). Known columns are mapped
/// to named fields; the rest are kept in `other`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComputerRow {
    #[serde(rename = "1", default)]
    pub name: Option<String>,
    #[serde(rename = "2", default)]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl ComputerRow {
    /// Hostname of the row, if present and not blank
    #[must_use]
    pub fn hostname(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_maps_numeric_columns() {
        let body = r#"{
            "totalcount": 2,
            "count": 2,
            "sort": [15],
            "order": ["ASC"],
            "data": [
                {"1": "srv1", "2": 10, "12": "Windows", "15": "2024-01-01 10:00:00"},
                {"1": "srv2", "2": 11, "12": null, "15": null}
            ]
        }"#;

        let page: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.totalcount, 2);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].hostname(), Some("srv1"));
        assert_eq!(page.data[0].id, Some(10));
        assert_eq!(
            page.data[0].other.get("12"),
            Some(&Value::String("Windows".to_string()))
        );
    }

    #[test]
    fn test_empty_search_has_no_data() {
        let page: SearchResponse = serde_json::from_str(r#"{"totalcount": 0}"#).unwrap();
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_blank_name_is_not_a_hostname() {
        let row: ComputerRow = serde_json::from_str(r#"{"1": "  ", "2": 3}"#).unwrap();
        assert_eq!(row.hostname(), None);

        let row: ComputerRow = serde_json::from_str(r#"{"2": 3}"#).unwrap();
        assert_eq!(row.hostname(), None);
    }
}
