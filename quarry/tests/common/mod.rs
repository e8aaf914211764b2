//! In-memory backend that records every request it receives

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use quarry::backend::{DocumentBackend, IndicesBackend, SearchBackend};
use quarry::error::BackendError;
use quarry::request::{
    BulkRequest, CountRequest, CreateIndexRequest, DocumentRef, IndexRef, IndexRequest,
    PutMappingRequest, ScrollRequest, SearchRequest, UpdateRequest,
};
use quarry::response::{
    Acknowledged, BulkResponse, CountResponse, GetResponse, SearchResponse, WriteResponse,
};
use quarry::Result;
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A search response with the given total and `(source, sort)` hits
pub fn search_response(total: u64, hits: Vec<(Value, Vec<Value>)>) -> SearchResponse {
    let hits: Vec<Value> = hits
        .into_iter()
        .enumerate()
        .map(|(i, (source, sort))| {
            json!({"_index": "flats", "_id": i.to_string(), "_score": null, "_source": source, "sort": sort})
        })
        .collect();
    serde_json::from_value(json!({
        "took": 2,
        "timed_out": false,
        "hits": {"total": {"value": total, "relation": "eq"}, "max_score": null, "hits": hits}
    }))
    .unwrap()
}

pub fn backend_error(status: u16, error_type: &str) -> quarry::Error {
    BackendError::from_body(
        Some(status),
        &json!({
            "error": {
                "root_cause": [{"type": error_type, "reason": "fake"}],
                "type": error_type,
                "reason": "fake"
            },
            "status": status
        }),
    )
    .into()
}

#[derive(Default)]
pub struct FakeBackend {
    pub searches: Mutex<Vec<SearchRequest>>,
    pub scrolls: Mutex<Vec<ScrollRequest>>,
    pub counts: Mutex<Vec<CountRequest>>,
    pub calls: Mutex<Vec<String>>,
    search_results: Mutex<VecDeque<Result<SearchResponse>>>,
    count_results: Mutex<VecDeque<Result<CountResponse>>>,
    documents: Mutex<BTreeMap<(String, String), Value>>,
    indices: Mutex<BTreeMap<String, Option<Value>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next search or scroll
    pub fn push_search(&self, result: Result<SearchResponse>) {
        self.search_results.lock().push_back(result);
    }

    pub fn push_count(&self, result: Result<CountResponse>) {
        self.count_results.lock().push_back(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn document(&self, index: &str, id: &str) -> Option<Value> {
        self.documents.lock().get(&(index.to_string(), id.to_string())).cloned()
    }

    pub fn mapping_of(&self, index: &str) -> Option<Value> {
        self.indices.lock().get(index).cloned().flatten()
    }

    fn record(&self, call: &str) {
        self.calls.lock().push(call.to_string());
    }

    fn next_search(&self) -> Result<SearchResponse> {
        self.search_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchResponse::default()))
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.record("search");
        self.searches.lock().push(request.clone());
        self.next_search()
    }

    async fn scroll(&self, request: &ScrollRequest) -> Result<SearchResponse> {
        self.record("scroll");
        self.scrolls.lock().push(request.clone());
        self.next_search()
    }

    async fn count(&self, request: &CountRequest) -> Result<CountResponse> {
        self.record("count");
        self.counts.lock().push(request.clone());
        self.count_results
            .lock()
            .pop_front()
            .unwrap_or(Ok(CountResponse { count: 0 }))
    }
}

#[async_trait]
impl DocumentBackend for FakeBackend {
    async fn create(&self, request: &IndexRequest) -> Result<WriteResponse> {
        self.record("create");
        let key = (request.index.clone(), request.id.clone());
        let mut documents = self.documents.lock();
        if documents.contains_key(&key) {
            return Err(backend_error(409, "version_conflict_engine_exception"));
        }
        documents.insert(key, request.body.clone());
        Ok(WriteResponse {
            index: Some(request.index.clone()),
            id: request.id.clone(),
            version: Some(1),
            result: "created".to_string(),
            ignored_insert: false,
        })
    }

    async fn index(&self, request: &IndexRequest) -> Result<WriteResponse> {
        self.record("index");
        let key = (request.index.clone(), request.id.clone());
        let previous = self.documents.lock().insert(key, request.body.clone());
        Ok(WriteResponse {
            index: Some(request.index.clone()),
            id: request.id.clone(),
            version: None,
            result: if previous.is_some() { "updated" } else { "created" }.to_string(),
            ignored_insert: false,
        })
    }

    async fn get(&self, document: &DocumentRef) -> Result<GetResponse> {
        self.record("get");
        let source = self.document(&document.index, &document.id);
        Ok(GetResponse {
            index: Some(document.index.clone()),
            id: document.id.clone(),
            found: source.is_some(),
            source,
        })
    }

    async fn exists(&self, document: &DocumentRef) -> Result<bool> {
        self.record("exists");
        Ok(self.document(&document.index, &document.id).is_some())
    }

    async fn update(&self, request: &UpdateRequest) -> Result<WriteResponse> {
        self.record("update");
        let key = (request.index.clone(), request.id.clone());
        let mut documents = self.documents.lock();
        let Some(Value::Object(stored)) = documents.get_mut(&key) else {
            return Err(backend_error(404, "document_missing_exception"));
        };
        if let Value::Object(patch) = &request.body.doc {
            for (field, value) in patch {
                stored.insert(field.clone(), value.clone());
            }
        }
        Ok(WriteResponse {
            index: Some(request.index.clone()),
            id: request.id.clone(),
            version: None,
            result: "updated".to_string(),
            ignored_insert: false,
        })
    }

    async fn delete(&self, document: &DocumentRef) -> Result<WriteResponse> {
        self.record("delete");
        self.documents
            .lock()
            .remove(&(document.index.clone(), document.id.clone()));
        Ok(WriteResponse {
            index: Some(document.index.clone()),
            id: document.id.clone(),
            version: None,
            result: "deleted".to_string(),
            ignored_insert: false,
        })
    }

    async fn bulk(&self, request: &BulkRequest) -> Result<BulkResponse> {
        self.record("bulk");
        Ok(BulkResponse {
            took: 1,
            errors: false,
            items: vec![Default::default(); request.len()],
        })
    }
}

#[async_trait]
impl IndicesBackend for FakeBackend {
    async fn index_exists(&self, index: &IndexRef) -> Result<bool> {
        self.record("index_exists");
        Ok(self.indices.lock().contains_key(&index.index))
    }

    async fn create_index(&self, request: &CreateIndexRequest) -> Result<Acknowledged> {
        self.record("create_index");
        let mut indices = self.indices.lock();
        if indices.contains_key(&request.index) {
            return Err(backend_error(400, "resource_already_exists_exception"));
        }
        indices.insert(request.index.clone(), None);
        Ok(Acknowledged::new(Some(request.index.clone())))
    }

    async fn delete_index(&self, index: &IndexRef) -> Result<Acknowledged> {
        self.record("delete_index");
        match self.indices.lock().remove(&index.index) {
            Some(_) => Ok(Acknowledged::new(None)),
            None => Err(backend_error(404, "index_not_found_exception")),
        }
    }

    async fn refresh(&self, _index: &IndexRef) -> Result<Value> {
        self.record("refresh");
        Ok(json!({"_shards": {"total": 1, "successful": 1, "failed": 0}}))
    }

    async fn get_mapping(&self, index: &IndexRef) -> Result<Value> {
        self.record("get_mapping");
        let properties = self.mapping_of(&index.index).unwrap_or_else(|| json!({}));
        Ok(json!({ index.index.as_str(): {"mappings": {"properties": properties}} }))
    }

    async fn put_mapping(&self, request: &PutMappingRequest) -> Result<Acknowledged> {
        self.record("put_mapping");
        let properties = request.body.as_ref().map(|body| body.properties.clone());
        self.indices.lock().insert(request.index.clone(), properties);
        Ok(Acknowledged::new(None))
    }
}
