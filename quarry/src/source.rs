//! Search body composition
//!
//! [`SearchSourceBuilder`] collects a query, named aggregations, sort
//! criteria, source filtering and paging, and projects them into an
//! immutable [`SearchBody`]. Building is side-effect free; the same builder
//! can be built any number of times.

use crate::aggregation::{Aggregation, SubAggregations};
use crate::config::SourceConfig;
use crate::query::Query;
use crate::sort::Sort;
use crate::Result;
use serde::Serialize;
use serde_json::Value;

/// `_source` filtering
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

impl SourceFilter {
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

/// The JSON body of one search request. Unset keys are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    #[serde(skip_serializing_if = "SubAggregations::is_empty")]
    pub aggregations: SubAggregations,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    #[serde(rename = "_source", skip_serializing_if = "SourceFilter::is_empty")]
    pub source: SourceFilter,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<Sort>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub search_after: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
}

impl SearchBody {
    /// True when the body would serialize to `{}`
    pub fn is_empty(&self) -> bool {
        self.query.is_none()
            && self.aggregations.is_empty()
            && self.size.is_none()
            && self.from.is_none()
            && self.source.is_empty()
            && self.sort.is_empty()
            && self.search_after.is_empty()
            && self.min_score.is_none()
    }

    /// The same body with `from`, `size`, `sort` and `search_after` removed
    pub fn without_pagination(&self) -> SearchBody {
        SearchBody {
            from: None,
            size: None,
            sort: Vec::new(),
            search_after: Vec::new(),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(query) = &self.query {
            query.validate()?;
        }
        self.aggregations.validate()?;
        self.sort.iter().try_for_each(Sort::validate)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Assembles a [`SearchBody`]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSourceBuilder {
    query: Option<Query>,
    aggregations: SubAggregations,
    sort: Vec<Sort>,
    from: u64,
    size: u64,
    includes: Vec<String>,
    excludes: Vec<String>,
    search_after: Vec<Value>,
}

impl Default for SearchSourceBuilder {
    fn default() -> Self {
        Self::with_config(&SourceConfig::default())
    }
}

impl SearchSourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &SourceConfig) -> Self {
        Self {
            query: None,
            aggregations: SubAggregations::new(),
            sort: Vec::new(),
            from: 0,
            size: config.default_size,
            includes: Vec::new(),
            excludes: Vec::new(),
            search_after: Vec::new(),
        }
    }

    /// Replaces any earlier query
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Adds an aggregation; a later one with the same name replaces the earlier
    pub fn aggregation(mut self, aggregation: impl Into<Aggregation>) -> Self {
        self.aggregations.insert(aggregation);
        self
    }

    /// Appends a sort criterion
    pub fn sort(mut self, sort: impl Into<Sort>) -> Self {
        self.sort.push(sort.into());
        self
    }

    pub fn from(mut self, from: u64) -> Self {
        self.from = from;
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Keyset marker: the sort values of the last row already seen
    pub fn search_after(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.search_after = values.into_iter().collect();
        self
    }

    /// Project the accumulated state into a body, validating every node.
    /// `from` and `size` are always present.
    pub fn build(&self) -> Result<SearchBody> {
        let body = SearchBody {
            query: self.query.clone(),
            aggregations: self.aggregations.clone(),
            size: Some(self.size),
            from: Some(self.from),
            source: SourceFilter {
                includes: self.includes.clone(),
                excludes: self.excludes.clone(),
            },
            sort: self.sort.clone(),
            search_after: self.search_after.clone(),
            min_score: None,
        };
        body.validate()?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{avg, stats, terms};
    use crate::error::Error;
    use crate::query::{bool_query, match_all, range, term};
    use crate::sort::{field_sort, SortOrder};
    use serde_json::json;

    #[test]
    fn test_minimal_body_has_size_and_from() {
        let body = SearchSourceBuilder::new().build().unwrap();
        assert_eq!(body.to_value(), json!({"size": 10, "from": 0}));
    }

    #[test]
    fn test_full_body() {
        let body = SearchSourceBuilder::new()
            .query(bool_query().must(term("status", "active")))
            .aggregation(terms("by_city", "city"))
            .sort(field_sort("created_at"))
            .sort(field_sort("id").order(SortOrder::Asc))
            .from(20)
            .size(5)
            .include(["id", "title"])
            .exclude(["body"])
            .search_after([json!(1700000000), json!(42)])
            .build()
            .unwrap();
        assert_eq!(
            body.to_value(),
            json!({
                "query": {"bool": {"must": [{"term": {"status": {"value": "active"}}}]}},
                "aggregations": {"by_city": {"terms": {"field": "city", "size": 10}}},
                "size": 5,
                "from": 20,
                "_source": {"includes": ["id", "title"], "excludes": ["body"]},
                "sort": [{"created_at": {"order": "desc"}}, {"id": {"order": "asc"}}],
                "search_after": [1700000000, 42]
            })
        );
    }

    #[test]
    fn test_source_filter_parts_independent() {
        let body = SearchSourceBuilder::new().exclude(["secret"]).build().unwrap();
        assert_eq!(body.to_value()["_source"], json!({"excludes": ["secret"]}));
    }

    #[test]
    fn test_aggregations_merge_by_name() {
        let body = SearchSourceBuilder::new()
            .aggregation(avg("price", "price"))
            .aggregation(avg("area", "area"))
            .aggregation(stats("price", "price"))
            .build()
            .unwrap();
        assert_eq!(
            body.to_value()["aggregations"],
            json!({
                "price": {"stats": {"field": "price"}},
                "area": {"avg": {"field": "area"}}
            })
        );
    }

    #[test]
    fn test_build_is_repeatable() {
        let builder = SearchSourceBuilder::new().query(match_all()).size(3);
        assert_eq!(builder.build().unwrap(), builder.build().unwrap());
    }

    #[test]
    fn test_build_validates() {
        let err = SearchSourceBuilder::new().query(range("")).build().unwrap_err();
        assert!(matches!(err, Error::MissingField(f) if f == "range.field"));
        let err = SearchSourceBuilder::new().sort(field_sort("")).build().unwrap_err();
        assert!(matches!(err, Error::MissingField(f) if f == "sort.field"));
    }

    #[test]
    fn test_default_size_from_config() {
        let body = SearchSourceBuilder::with_config(&SourceConfig { default_size: 25 })
            .build()
            .unwrap();
        assert_eq!(body.size, Some(25));
    }

    #[test]
    fn test_without_pagination() {
        let body = SearchSourceBuilder::new()
            .query(term("a", 1))
            .sort(field_sort("b"))
            .search_after([json!(1)])
            .build()
            .unwrap()
            .without_pagination();
        assert_eq!(body.to_value(), json!({"query": {"term": {"a": {"value": 1}}}}));
        assert!(SearchBody::default().is_empty());
        assert!(!body.is_empty());
    }
}
