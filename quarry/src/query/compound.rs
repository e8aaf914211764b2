//! Compound clauses: bool and nested

use super::{require_field, serialize_tagged, Query};
use crate::Result;
use serde::{Serialize, Serializer};
use serde_json::Map;

/// Combines child clauses under must / must_not / filter / should.
///
/// Each adder appends to its clause list in call order. Empty lists are
/// left out of the serialized form, so an empty bool is `{"bool": {}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Query>,
    pub must_not: Vec<Query>,
    pub filter: Vec<Query>,
    pub should: Vec<Query>,
    pub minimum_should_match: Option<i32>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, query: impl Into<Query>) -> Self {
        self.push_must(query);
        self
    }

    pub fn must_not(mut self, query: impl Into<Query>) -> Self {
        self.push_must_not(query);
        self
    }

    pub fn filter(mut self, query: impl Into<Query>) -> Self {
        self.push_filter(query);
        self
    }

    pub fn should(mut self, query: impl Into<Query>) -> Self {
        self.push_should(query);
        self
    }

    pub fn minimum_should_match(mut self, minimum: i32) -> Self {
        self.minimum_should_match = Some(minimum);
        self
    }

    pub fn push_must(&mut self, query: impl Into<Query>) {
        self.must.push(query.into());
    }

    pub fn push_must_not(&mut self, query: impl Into<Query>) {
        self.must_not.push(query.into());
    }

    pub fn push_filter(&mut self, query: impl Into<Query>) {
        self.filter.push(query.into());
    }

    pub fn push_should(&mut self, query: impl Into<Query>) {
        self.should.push(query.into());
    }

    /// No clause and no threshold set
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.must_not.is_empty()
            && self.filter.is_empty()
            && self.should.is_empty()
            && self.minimum_should_match.is_none()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.must
            .iter()
            .chain(&self.must_not)
            .chain(&self.filter)
            .chain(&self.should)
            .try_for_each(Query::validate)
    }
}

impl Serialize for BoolQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            #[serde(skip_serializing_if = "<[Query]>::is_empty")]
            must: &'a [Query],
            #[serde(skip_serializing_if = "<[Query]>::is_empty")]
            must_not: &'a [Query],
            #[serde(skip_serializing_if = "<[Query]>::is_empty")]
            filter: &'a [Query],
            #[serde(skip_serializing_if = "<[Query]>::is_empty")]
            should: &'a [Query],
            #[serde(skip_serializing_if = "Option::is_none")]
            minimum_should_match: Option<i32>,
        }

        serialize_tagged(
            serializer,
            "bool",
            &Body {
                must: &self.must,
                must_not: &self.must_not,
                filter: &self.filter,
                should: &self.should,
                minimum_should_match: self.minimum_should_match,
            },
        )
    }
}

/// Query against nested objects under `path`; inner hits are always requested
#[derive(Debug, Clone, PartialEq)]
pub struct NestedQuery {
    pub path: String,
    pub query: Box<Query>,
}

impl NestedQuery {
    pub fn new(path: impl Into<String>, query: impl Into<Query>) -> Self {
        Self {
            path: path.into(),
            query: Box::new(query.into()),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require_field(&self.path, "nested")?;
        self.query.validate()
    }
}

impl Serialize for NestedQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            path: &'a str,
            query: &'a Query,
            inner_hits: Map<String, serde_json::Value>,
        }

        serialize_tagged(
            serializer,
            "nested",
            &Body {
                path: &self.path,
                query: &self.query,
                inner_hits: Map::new(),
            },
        )
    }
}
