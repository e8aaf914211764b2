//! Request envelopes handed to the backend
//!
//! Each envelope serializes to the parameter object the engine's clients
//! take: an `index` target plus a `body`, with optional keys left out.

use crate::query::Query;
use crate::source::SearchBody;
use serde::Serialize;
use serde_json::{json, Value};

/// `{index, body, scroll?}` for the search endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub index: String,
    pub body: SearchBody,
    /// Keep-alive for a scroll context opened by this search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll: Option<String>,
}

impl SearchRequest {
    pub fn new(index: impl Into<String>, body: SearchBody) -> Self {
        Self {
            index: index.into(),
            body,
            scroll: None,
        }
    }

    pub fn scroll(mut self, keep_alive: impl Into<String>) -> Self {
        self.scroll = Some(keep_alive.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CountBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
}

/// `{index, body: {query?}}` for the count endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRequest {
    pub index: String,
    pub body: CountBody,
}

impl CountRequest {
    pub fn new(index: impl Into<String>, query: Option<Query>) -> Self {
        Self {
            index: index.into(),
            body: CountBody { query },
        }
    }

    /// Count the documents a search body matches; everything but the query is dropped
    pub fn from_search(index: impl Into<String>, body: &SearchBody) -> Self {
        Self::new(index, body.query.clone())
    }
}

/// Continue a scroll context: `{scroll: "1m", scroll_id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollRequest {
    pub scroll: String,
    pub scroll_id: String,
}

impl ScrollRequest {
    pub fn new(scroll_id: impl Into<String>, keep_alive: impl Into<String>) -> Self {
        Self {
            scroll: keep_alive.into(),
            scroll_id: scroll_id.into(),
        }
    }
}

/// One document addressed by index and id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRef {
    pub index: String,
    pub id: String,
}

impl DocumentRef {
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
        }
    }
}

/// Store a document under an id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexRequest {
    pub index: String,
    pub id: String,
    pub body: Value,
}

impl IndexRequest {
    pub fn new(index: impl Into<String>, id: impl Into<String>, body: Value) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateBody {
    pub doc: Value,
}

/// Partial update: `{index, id, body: {doc}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateRequest {
    pub index: String,
    pub id: String,
    pub body: UpdateBody,
}

impl UpdateRequest {
    pub fn new(index: impl Into<String>, id: impl Into<String>, doc: Value) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            body: UpdateBody { doc },
        }
    }
}

/// One operation in a bulk request
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOperation {
    Index(IndexRequest),
    Update(UpdateRequest),
    Delete(DocumentRef),
}

impl BulkOperation {
    fn action(&self) -> &'static str {
        match self {
            BulkOperation::Index(_) => "index",
            BulkOperation::Update(_) => "update",
            BulkOperation::Delete(_) => "delete",
        }
    }

    fn target(&self) -> (&str, &str) {
        match self {
            BulkOperation::Index(r) => (&r.index, &r.id),
            BulkOperation::Update(r) => (&r.index, &r.id),
            BulkOperation::Delete(r) => (&r.index, &r.id),
        }
    }
}

/// Bulk request: action headers, each followed by its document when it has one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkRequest {
    pub operations: Vec<BulkOperation>,
}

impl BulkRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, operation: BulkOperation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn index(self, request: IndexRequest) -> Self {
        self.add(BulkOperation::Index(request))
    }

    pub fn update(self, request: UpdateRequest) -> Self {
        self.add(BulkOperation::Update(request))
    }

    pub fn delete(self, document: DocumentRef) -> Self {
        self.add(BulkOperation::Delete(document))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The alternating header/document sequence
    pub fn lines(&self) -> Vec<Value> {
        let mut lines = Vec::with_capacity(self.operations.len() * 2);
        for op in &self.operations {
            let (index, id) = op.target();
            lines.push(json!({ op.action(): { "_index": index, "_id": id } }));
            match op {
                BulkOperation::Index(r) => lines.push(r.body.clone()),
                BulkOperation::Update(r) => lines.push(json!({ "doc": r.body.doc })),
                BulkOperation::Delete(_) => {}
            }
        }
        lines
    }
}

impl Serialize for BulkRequest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body {
            body: Vec<Value>,
        }
        Body { body: self.lines() }.serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSettingsBody {
    pub settings: Value,
}

/// Create an index, optionally with settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateIndexRequest {
    pub index: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<IndexSettingsBody>,
}

impl CreateIndexRequest {
    pub fn new(index: impl Into<String>, settings: Option<Value>) -> Self {
        Self {
            index: index.into(),
            body: settings.map(|settings| IndexSettingsBody { settings }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingBody {
    pub properties: Value,
}

/// Put field mappings on an index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PutMappingRequest {
    pub index: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<MappingBody>,
}

impl PutMappingRequest {
    pub fn new(index: impl Into<String>, properties: Option<Value>) -> Self {
        Self {
            index: index.into(),
            body: properties.map(|properties| MappingBody { properties }),
        }
    }
}

/// A bare index target, for exists/delete/refresh/get-mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRef {
    pub index: String,
}

impl IndexRef {
    pub fn new(index: impl Into<String>) -> Self {
        Self { index: index.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::term;
    use crate::source::SearchSourceBuilder;

    #[test]
    fn test_search_request_shape() {
        let body = SearchSourceBuilder::new().query(term("a", "b")).build().unwrap();
        let v = serde_json::to_value(SearchRequest::new("flats", body)).unwrap();
        assert_eq!(
            v,
            json!({"index": "flats", "body": {"query": {"term": {"a": {"value": "b"}}}, "size": 10, "from": 0}})
        );
        let v = serde_json::to_value(SearchRequest::new("flats", SearchBody::default()).scroll("1m")).unwrap();
        assert_eq!(v, json!({"index": "flats", "body": {}, "scroll": "1m"}));
    }

    #[test]
    fn test_count_request_keeps_only_query() {
        let body = SearchSourceBuilder::new().query(term("a", "b")).size(50).build().unwrap();
        let v = serde_json::to_value(CountRequest::from_search("flats", &body)).unwrap();
        assert_eq!(v, json!({"index": "flats", "body": {"query": {"term": {"a": {"value": "b"}}}}}));
        let v = serde_json::to_value(CountRequest::new("flats", None)).unwrap();
        assert_eq!(v, json!({"index": "flats", "body": {}}));
    }

    #[test]
    fn test_scroll_request_shape() {
        let v = serde_json::to_value(ScrollRequest::new("DXF1ZXJ5", "1m")).unwrap();
        assert_eq!(v, json!({"scroll": "1m", "scroll_id": "DXF1ZXJ5"}));
    }

    #[test]
    fn test_update_wraps_doc() {
        let v = serde_json::to_value(UpdateRequest::new("flats", "7", json!({"price": 10}))).unwrap();
        assert_eq!(v, json!({"index": "flats", "id": "7", "body": {"doc": {"price": 10}}}));
    }

    #[test]
    fn test_bulk_lines() {
        let bulk = BulkRequest::new()
            .index(IndexRequest::new("flats", "1", json!({"title": "a"})))
            .delete(DocumentRef::new("flats", "2"))
            .update(UpdateRequest::new("flats", "3", json!({"title": "c"})));
        assert_eq!(bulk.len(), 3);
        assert_eq!(
            serde_json::to_value(&bulk).unwrap(),
            json!({"body": [
                {"index": {"_index": "flats", "_id": "1"}},
                {"title": "a"},
                {"delete": {"_index": "flats", "_id": "2"}},
                {"update": {"_index": "flats", "_id": "3"}},
                {"doc": {"title": "c"}}
            ]})
        );
    }

    #[test]
    fn test_admin_envelopes_omit_absent_body() {
        assert_eq!(
            serde_json::to_value(CreateIndexRequest::new("flats", None)).unwrap(),
            json!({"index": "flats"})
        );
        assert_eq!(
            serde_json::to_value(CreateIndexRequest::new("flats", Some(json!({"number_of_shards": 1})))).unwrap(),
            json!({"index": "flats", "body": {"settings": {"number_of_shards": 1}}})
        );
        assert_eq!(
            serde_json::to_value(PutMappingRequest::new("flats", Some(json!({"title": {"type": "text"}})))).unwrap(),
            json!({"index": "flats", "body": {"properties": {"title": {"type": "text"}}}})
        );
    }
}
