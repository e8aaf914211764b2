//! The search backend boundary
//!
//! Transport, retries and authentication live behind these traits. Callers
//! build one backend value at startup and lend it to sessions and
//! repositories; nothing in this crate holds a global client.

use crate::request::{
    BulkRequest, CountRequest, CreateIndexRequest, DocumentRef, IndexRef, IndexRequest,
    PutMappingRequest, ScrollRequest, SearchRequest, UpdateRequest,
};
use crate::response::{
    Acknowledged, BulkResponse, CountResponse, GetResponse, SearchResponse, WriteResponse,
};
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Search, scroll continuation and count
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Next page of an open scroll context
    async fn scroll(&self, request: &ScrollRequest) -> Result<SearchResponse>;

    async fn count(&self, request: &CountRequest) -> Result<CountResponse>;
}

/// Single-document and bulk writes
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Create only; a document already stored under the id is a version conflict
    async fn create(&self, request: &IndexRequest) -> Result<WriteResponse>;

    /// Create or overwrite
    async fn index(&self, request: &IndexRequest) -> Result<WriteResponse>;

    async fn get(&self, document: &DocumentRef) -> Result<GetResponse>;

    async fn exists(&self, document: &DocumentRef) -> Result<bool>;

    async fn update(&self, request: &UpdateRequest) -> Result<WriteResponse>;

    async fn delete(&self, document: &DocumentRef) -> Result<WriteResponse>;

    async fn bulk(&self, request: &BulkRequest) -> Result<BulkResponse>;
}

/// Index administration
#[async_trait]
pub trait IndicesBackend: Send + Sync {
    async fn index_exists(&self, index: &IndexRef) -> Result<bool>;

    async fn create_index(&self, request: &CreateIndexRequest) -> Result<Acknowledged>;

    async fn delete_index(&self, index: &IndexRef) -> Result<Acknowledged>;

    async fn refresh(&self, index: &IndexRef) -> Result<Value>;

    /// `{<index>: {mappings: {properties: {...}}}}`
    async fn get_mapping(&self, index: &IndexRef) -> Result<Value>;

    async fn put_mapping(&self, request: &PutMappingRequest) -> Result<Acknowledged>;
}

/// Everything a repository needs from one client
pub trait Backend: SearchBackend + DocumentBackend + IndicesBackend {}

impl<T: SearchBackend + DocumentBackend + IndicesBackend> Backend for T {}
