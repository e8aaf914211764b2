//! Query DSL nodes
//!
//! Every node serializes to the engine's nested object form, e.g.
//! `{"term": {"status": {"value": "active"}}}`. Build nodes through the factory
//! functions in this module and convert them into [`Query`] with `.into()`
//! wherever a clause is expected.
//!
//! Supported node types:
//! - `match_all`
//! - `term` / `terms`
//! - `match` / `match_phrase` / `match_phrase_prefix`
//! - `exists`
//! - `range`
//! - `geo_distance` / `geo_bounding_box`
//! - `bool` / `nested`

mod compound;
mod geo;
mod leaf;

pub use compound::{BoolQuery, NestedQuery};
pub use geo::{Corner, GeoBoundingBoxQuery, GeoDistanceQuery};
pub use leaf::{
    ExistsQuery, Fuzziness, MatchAllQuery, MatchPhrasePrefixQuery, MatchPhraseQuery, MatchQuery,
    Operator, RangeOp, RangeQuery, TermQuery, TermsQuery,
};

use crate::geo::{Distance, GeoPoint};
use crate::Result;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// One leaf or compound query clause
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll(MatchAllQuery),
    Term(TermQuery),
    Terms(TermsQuery),
    Match(MatchQuery),
    MatchPhrase(MatchPhraseQuery),
    MatchPhrasePrefix(MatchPhrasePrefixQuery),
    Exists(ExistsQuery),
    Range(RangeQuery),
    GeoDistance(GeoDistanceQuery),
    GeoBoundingBox(GeoBoundingBoxQuery),
    Bool(BoolQuery),
    Nested(NestedQuery),
}

impl Query {
    /// Wire name of the clause
    pub fn kind(&self) -> &'static str {
        match self {
            Query::MatchAll(_) => "match_all",
            Query::Term(_) => "term",
            Query::Terms(_) => "terms",
            Query::Match(_) => "match",
            Query::MatchPhrase(_) => "match_phrase",
            Query::MatchPhrasePrefix(_) => "match_phrase_prefix",
            Query::Exists(_) => "exists",
            Query::Range(_) => "range",
            Query::GeoDistance(_) => "geo_distance",
            Query::GeoBoundingBox(_) => "geo_bounding_box",
            Query::Bool(_) => "bool",
            Query::Nested(_) => "nested",
        }
    }

    /// Check required fields, recursing into compound clauses
    pub fn validate(&self) -> Result<()> {
        match self {
            Query::MatchAll(_) => Ok(()),
            Query::Term(q) => require_field(&q.field, "term"),
            Query::Terms(q) => require_field(&q.field, "terms"),
            Query::Match(q) => require_field(&q.field, "match"),
            Query::MatchPhrase(q) => require_field(&q.field, "match_phrase"),
            Query::MatchPhrasePrefix(q) => require_field(&q.field, "match_phrase_prefix"),
            Query::Exists(q) => require_field(&q.field, "exists"),
            Query::Range(q) => require_field(&q.field, "range"),
            Query::GeoDistance(q) => require_field(&q.field, "geo_distance"),
            Query::GeoBoundingBox(q) => q.validate(),
            Query::Bool(q) => q.validate(),
            Query::Nested(q) => q.validate(),
        }
    }

    /// Validate, then serialize into a JSON value
    pub fn to_value(&self) -> Result<Value> {
        self.validate()?;
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Query::MatchAll(q) => q.serialize(serializer),
            Query::Term(q) => q.serialize(serializer),
            Query::Terms(q) => q.serialize(serializer),
            Query::Match(q) => q.serialize(serializer),
            Query::MatchPhrase(q) => q.serialize(serializer),
            Query::MatchPhrasePrefix(q) => q.serialize(serializer),
            Query::Exists(q) => q.serialize(serializer),
            Query::Range(q) => q.serialize(serializer),
            Query::GeoDistance(q) => q.serialize(serializer),
            Query::GeoBoundingBox(q) => q.serialize(serializer),
            Query::Bool(q) => q.serialize(serializer),
            Query::Nested(q) => q.serialize(serializer),
        }
    }
}

macro_rules! impl_into_query {
    ($($node:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$node> for Query {
                fn from(node: $node) -> Self {
                    Query::$variant(node)
                }
            }
        )*
    };
}

impl_into_query! {
    MatchAllQuery => MatchAll,
    TermQuery => Term,
    TermsQuery => Terms,
    MatchQuery => Match,
    MatchPhraseQuery => MatchPhrase,
    MatchPhrasePrefixQuery => MatchPhrasePrefix,
    ExistsQuery => Exists,
    RangeQuery => Range,
    GeoDistanceQuery => GeoDistance,
    GeoBoundingBoxQuery => GeoBoundingBox,
    BoolQuery => Bool,
    NestedQuery => Nested,
}

pub fn bool_query() -> BoolQuery {
    BoolQuery::default()
}

pub fn match_all() -> MatchAllQuery {
    MatchAllQuery::default()
}

pub fn term(field: impl Into<String>, value: impl Into<Value>) -> TermQuery {
    TermQuery::new(field, value)
}

pub fn terms<I, V>(field: impl Into<String>, values: I) -> TermsQuery
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    TermsQuery::new(field, values)
}

pub fn match_query(field: impl Into<String>, query: impl Into<String>) -> MatchQuery {
    MatchQuery::new(field, query)
}

pub fn match_phrase(field: impl Into<String>, query: impl Into<String>) -> MatchPhraseQuery {
    MatchPhraseQuery::new(field, query)
}

pub fn match_phrase_prefix(
    field: impl Into<String>,
    query: impl Into<String>,
) -> MatchPhrasePrefixQuery {
    MatchPhrasePrefixQuery::new(field, query)
}

pub fn exists(field: impl Into<String>) -> ExistsQuery {
    ExistsQuery::new(field)
}

pub fn range(field: impl Into<String>) -> RangeQuery {
    RangeQuery::new(field)
}

pub fn geo_distance(field: impl Into<String>, point: GeoPoint, distance: Distance) -> GeoDistanceQuery {
    GeoDistanceQuery::new(field, point, distance)
}

pub fn geo_bounding_box(field: impl Into<String>) -> GeoBoundingBoxQuery {
    GeoBoundingBoxQuery::new(field)
}

pub fn nested(path: impl Into<String>, query: impl Into<Query>) -> NestedQuery {
    NestedQuery::new(path, query)
}

fn require_field(field: &str, kind: &str) -> Result<()> {
    if field.trim().is_empty() {
        return Err(crate::Error::missing(format!("{kind}.field")));
    }
    Ok(())
}

/// `{tag: body}`
pub(crate) fn serialize_tagged<S, T>(serializer: S, tag: &str, body: &T) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + ?Sized,
{
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(tag, body)?;
    map.end()
}

/// `{field: body}`, the shape shared by most leaf clauses
pub(crate) struct FieldClause<'a, T: ?Sized>(pub &'a str, pub &'a T);

impl<T: Serialize + ?Sized> Serialize for FieldClause<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize_tagged(serializer, self.0, self.1)
    }
}
