//! Index-backed entities
//!
//! An entity type implements [`Indexable`] to describe its index. A
//! [`Repository`] pairs one such entity with a backend and provides the
//! document and index calls on its behalf.
//!
//! Two backend failures mean the desired end state already holds and are
//! turned into success:
//! - `resource_already_exists_exception` when creating the index
//! - `version_conflict_engine_exception` when inserting a document
//!
//! Every other backend error is returned unchanged.

use crate::backend::Backend;
use crate::config::SessionConfig;
use crate::error::Error;
use crate::request::{
    BulkRequest, CountRequest, CreateIndexRequest, DocumentRef, IndexRef, IndexRequest,
    PutMappingRequest, UpdateRequest,
};
use crate::response::{
    Acknowledged, BulkResponse, CountResponse, GetResponse, WriteResponse,
};
use crate::query::Query;
use crate::session::Session;
use crate::Result;
use serde_json::Value;
use tracing::debug;

const ALREADY_EXISTS: &str = "resource_already_exists_exception";
const VERSION_CONFLICT: &str = "version_conflict_engine_exception";

/// Describes the index an entity lives in
pub trait Indexable {
    fn index_name(&self) -> &str;

    /// Index settings sent on creation
    fn settings(&self) -> Option<Value> {
        None
    }

    /// Field mappings put on a freshly created index
    fn mapping_properties(&self) -> Option<Value> {
        None
    }
}

/// Document and index operations for one entity
pub struct Repository<'a, E, B> {
    entity: &'a E,
    backend: &'a B,
    session_config: SessionConfig,
}

impl<'a, E: Indexable, B: Backend> Repository<'a, E, B> {
    pub fn new(entity: &'a E, backend: &'a B) -> Self {
        Self {
            entity,
            backend,
            session_config: SessionConfig::default(),
        }
    }

    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn index(&self) -> &str {
        self.entity.index_name()
    }

    fn index_ref(&self) -> IndexRef {
        IndexRef::new(self.index())
    }

    fn document(&self, id: &str) -> DocumentRef {
        DocumentRef::new(self.index(), id)
    }

    /// A search session on this index
    pub fn session(&self) -> Session<'a> {
        Session::with_config(self.backend, self.index(), self.session_config.clone())
    }

    /// Create the index with its mapping, or read the mapping if it already exists
    pub async fn get_or_create(&self) -> Result<Value> {
        if self.index_exists().await? {
            return self.backend.get_mapping(&self.index_ref()).await;
        }
        let created = self.create_index().await?;
        let request = PutMappingRequest::new(self.index(), self.entity.mapping_properties());
        self.backend.put_mapping(&request).await?;
        Ok(serde_json::to_value(created)?)
    }

    pub async fn index_exists(&self) -> Result<bool> {
        self.backend.index_exists(&self.index_ref()).await
    }

    pub async fn create_index(&self) -> Result<Acknowledged> {
        let request = CreateIndexRequest::new(self.index(), self.entity.settings());
        match self.backend.create_index(&request).await {
            Err(err) if err.root_cause_type() == Some(ALREADY_EXISTS) => {
                debug!(index = %self.index(), "index already exists");
                Ok(Acknowledged::new(Some(self.index().to_string())))
            }
            result => result,
        }
    }

    pub async fn delete_index(&self) -> Result<Acknowledged> {
        match self.backend.delete_index(&self.index_ref()).await {
            Err(err) if err.status() == Some(404) => {
                debug!(index = %self.index(), "index already absent");
                Ok(Acknowledged::new(None))
            }
            result => result,
        }
    }

    /// Create a document; one already stored under `id` counts as created
    pub async fn insert(&self, id: &str, document: Value) -> Result<WriteResponse> {
        let request = IndexRequest::new(self.index(), id, document);
        match self.backend.create(&request).await {
            Err(err) if err.root_cause_type() == Some(VERSION_CONFLICT) => {
                debug!(index = %self.index(), id, "document already exists, insert ignored");
                Ok(WriteResponse {
                    index: Some(self.index().to_string()),
                    id: id.to_string(),
                    version: None,
                    result: "created".to_string(),
                    ignored_insert: true,
                })
            }
            result => result,
        }
    }

    /// Insert unless a document exists under `id`; `None` when one does
    pub async fn insert_if_not_exists(&self, id: &str, document: Value) -> Result<Option<WriteResponse>> {
        if self.exists(id).await? {
            return Ok(None);
        }
        self.insert(id, document).await.map(Some)
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        self.backend.exists(&self.document(id)).await
    }

    pub async fn get(&self, id: &str) -> Result<GetResponse> {
        self.backend.get(&self.document(id)).await
    }

    /// Partial update with `{doc: ...}`
    pub async fn update(&self, id: &str, doc: Value) -> Result<WriteResponse> {
        self.backend.update(&UpdateRequest::new(self.index(), id, doc)).await
    }

    /// Delete a document; deleting an absent one reports `deleted` without a call
    pub async fn delete(&self, id: &str) -> Result<WriteResponse> {
        if self.exists(id).await? {
            return self.backend.delete(&self.document(id)).await;
        }
        Ok(WriteResponse {
            index: None,
            id: id.to_string(),
            version: None,
            result: "deleted".to_string(),
            ignored_insert: false,
        })
    }

    pub async fn refresh(&self) -> Result<Value> {
        self.backend.refresh(&self.index_ref()).await
    }

    pub async fn bulk(&self, request: &BulkRequest) -> Result<BulkResponse> {
        self.backend.bulk(request).await
    }

    /// Field mappings of the index: `[index].mappings.properties`
    pub async fn mapping(&self) -> Result<Value> {
        let mapping = self.backend.get_mapping(&self.index_ref()).await?;
        mapping
            .get(self.index())
            .and_then(|m| m.get("mappings"))
            .and_then(|m| m.get("properties"))
            .cloned()
            .ok_or_else(|| Error::missing(format!("{}.mappings.properties", self.index())))
    }

    pub async fn count(&self, query: Option<Query>) -> Result<CountResponse> {
        if let Some(query) = &query {
            query.validate()?;
        }
        self.backend.count(&CountRequest::new(self.index(), query)).await
    }
}
