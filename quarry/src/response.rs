//! Backend responses and the reshaped results handed back to callers

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Search (or scroll) response as the engine returns it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(rename = "_shards", default, skip_serializing_if = "Option::is_none")]
    pub shards: Option<ShardStats>,
    #[serde(default)]
    pub hits: HitsResponse,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Map<String, Value>>,
    #[serde(rename = "_scroll_id", default, skip_serializing_if = "Option::is_none")]
    pub scroll_id: Option<String>,
}

impl SearchResponse {
    /// Total reported by the engine, 0 when absent
    pub fn total(&self) -> u64 {
        self.hits.total.as_ref().map_or(0, TotalHits::value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardStats {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub successful: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub failed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// `{value, relation}` on current engines, a bare integer on older ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Object { value: u64, relation: String },
    Count(u64),
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            TotalHits::Object { value, .. } => *value,
            TotalHits::Count(value) => *value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index", default)]
    pub index: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Value,
    /// Sort key tuple of this row; present when the search was sorted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Result of a single-document write (create, index, update, delete)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteResponse {
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    pub result: String,
    /// Set when a create hit an existing document and was treated as done
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignored_insert: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetResponse {
    #[serde(rename = "_index", default)]
    pub index: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub found: bool,
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acknowledged {
    pub acknowledged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl Acknowledged {
    pub fn new(index: Option<String>) -> Self {
        Self {
            acknowledged: true,
            index,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<BulkItemResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkItemResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<BulkItemResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<BulkItemResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<BulkItemResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<BulkItemResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkItemResult {
    #[serde(rename = "_index", default)]
    pub index: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// `{next, total}`; `next` is an empty string when there is no further page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    pub next: String,
    pub total: u64,
}

/// One page of source documents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub list: Vec<Value>,
    pub total: u64,
    pub paginator: Paginator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationPage {
    pub aggregations: Map<String, Value>,
    pub total: u64,
}

impl Default for AggregationPage {
    fn default() -> Self {
        Self {
            aggregations: Map::new(),
            total: 0,
        }
    }
}

/// What `fetch` returns: a bare count for count queries, a page otherwise
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Fetched {
    Count(u64),
    Page(SearchPage),
}

impl Fetched {
    pub fn into_page(self) -> Option<SearchPage> {
        match self {
            Fetched::Page(page) => Some(page),
            Fetched::Count(_) => None,
        }
    }

    pub fn count(&self) -> Option<u64> {
        match self {
            Fetched::Count(count) => Some(*count),
            Fetched::Page(_) => None,
        }
    }
}
