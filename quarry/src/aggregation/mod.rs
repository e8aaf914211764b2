//! Aggregation nodes
//!
//! Every aggregation carries the caller-chosen name it is keyed by in the
//! request. Bucket and filter aggregations can hold sub-aggregations; those
//! merge by name, and attaching under a name already present replaces that
//! entry while every other name stays.
//!
//! Supported aggregations:
//! - metrics: `stats`, `extended_stats`, `avg`, `geo_centroid`, `percentiles`
//! - buckets: `terms`, `histogram`, `date_histogram`, `geohash_grid`
//! - `filter`

mod bucket;
mod filter;
mod metrics;

pub use bucket::{
    CalendarInterval, DateHistogramAggregation, GeohashGridAggregation, HistogramAggregation,
    TermsAggregation,
};
pub use filter::FilterAggregation;
pub use metrics::{Metric, MetricAggregation, PercentilesAggregation};

use crate::error::Error;
use crate::query::Query;
use crate::Result;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One named aggregation
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    Metric(MetricAggregation),
    Percentiles(PercentilesAggregation),
    Terms(TermsAggregation),
    Histogram(HistogramAggregation),
    DateHistogram(DateHistogramAggregation),
    GeohashGrid(GeohashGridAggregation),
    Filter(FilterAggregation),
}

impl Aggregation {
    pub fn name(&self) -> &str {
        match self {
            Aggregation::Metric(a) => &a.name,
            Aggregation::Percentiles(a) => &a.name,
            Aggregation::Terms(a) => &a.name,
            Aggregation::Histogram(a) => &a.name,
            Aggregation::DateHistogram(a) => &a.name,
            Aggregation::GeohashGrid(a) => &a.name,
            Aggregation::Filter(a) => &a.name,
        }
    }

    /// Wire name of the aggregation type
    pub fn kind(&self) -> &'static str {
        match self {
            Aggregation::Metric(a) => a.metric.as_str(),
            Aggregation::Percentiles(_) => "percentiles",
            Aggregation::Terms(_) => "terms",
            Aggregation::Histogram(_) => "histogram",
            Aggregation::DateHistogram(_) => "date_histogram",
            Aggregation::GeohashGrid(_) => "geohash_grid",
            Aggregation::Filter(_) => "filter",
        }
    }

    /// Sub-aggregations, for the kinds that can hold them
    pub fn sub_aggregations(&self) -> Option<&SubAggregations> {
        match self {
            Aggregation::Metric(_) | Aggregation::Percentiles(_) => None,
            Aggregation::Terms(a) => Some(&a.aggregations),
            Aggregation::Histogram(a) => Some(&a.aggregations),
            Aggregation::DateHistogram(a) => Some(&a.aggregations),
            Aggregation::GeohashGrid(a) => Some(&a.aggregations),
            Aggregation::Filter(a) => Some(&a.aggregations),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name().trim().is_empty() {
            return Err(Error::missing(format!("{}.name", self.kind())));
        }
        let field = match self {
            Aggregation::Metric(a) => Some(&a.field),
            Aggregation::Percentiles(a) => Some(&a.field),
            Aggregation::Terms(a) => Some(&a.field),
            Aggregation::Histogram(a) => Some(&a.field),
            Aggregation::DateHistogram(a) => Some(&a.field),
            Aggregation::GeohashGrid(a) => Some(&a.field),
            Aggregation::Filter(a) => {
                a.filter.validate()?;
                None
            }
        };
        if field.is_some_and(|f| f.trim().is_empty()) {
            return Err(Error::missing(format!("{}.field", self.kind())));
        }
        match self.sub_aggregations() {
            Some(subs) => subs.validate(),
            None => Ok(()),
        }
    }

    /// `{name: body}`, the standalone form of this aggregation; validates first
    pub fn to_named_value(&self) -> Result<Value> {
        self.validate()?;
        let mut map = Map::new();
        map.insert(self.name().to_string(), serde_json::to_value(self)?);
        Ok(Value::Object(map))
    }
}

/// Serializes the body only; the name is the key it sits under.
impl Serialize for Aggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Aggregation::Metric(a) => a.serialize(serializer),
            Aggregation::Percentiles(a) => a.serialize(serializer),
            Aggregation::Terms(a) => a.serialize(serializer),
            Aggregation::Histogram(a) => a.serialize(serializer),
            Aggregation::DateHistogram(a) => a.serialize(serializer),
            Aggregation::GeohashGrid(a) => a.serialize(serializer),
            Aggregation::Filter(a) => a.serialize(serializer),
        }
    }
}

macro_rules! impl_into_aggregation {
    ($($node:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$node> for Aggregation {
                fn from(node: $node) -> Self {
                    Aggregation::$variant(node)
                }
            }
        )*
    };
}

impl_into_aggregation! {
    MetricAggregation => Metric,
    PercentilesAggregation => Percentiles,
    TermsAggregation => Terms,
    HistogramAggregation => Histogram,
    DateHistogramAggregation => DateHistogram,
    GeohashGridAggregation => GeohashGrid,
    FilterAggregation => Filter,
}

/// Aggregations keyed by name; later insertions win on a name collision
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubAggregations(BTreeMap<String, Aggregation>);

impl SubAggregations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, aggregation: impl Into<Aggregation>) {
        let aggregation = aggregation.into();
        self.0.insert(aggregation.name().to_string(), aggregation);
    }

    /// Merge another map in; its entries win on collision
    pub fn extend(&mut self, other: SubAggregations) {
        self.0.extend(other.0);
    }

    pub fn get(&self, name: &str) -> Option<&Aggregation> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn validate(&self) -> Result<()> {
        self.0.values().try_for_each(Aggregation::validate)
    }
}

impl Serialize for SubAggregations {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<A: Into<Aggregation>> FromIterator<A> for SubAggregations {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        let mut map = SubAggregations::new();
        for aggregation in iter {
            map.insert(aggregation);
        }
        map
    }
}

/// Adds `sub_aggregation` to the aggregation kinds that hold children
macro_rules! impl_sub_aggregations {
    ($($node:ty),* $(,)?) => {
        $(
            impl $node {
                /// Attach a child aggregation, replacing any child of the same name
                pub fn sub_aggregation(mut self, aggregation: impl Into<$crate::aggregation::Aggregation>) -> Self {
                    self.aggregations.insert(aggregation);
                    self
                }
            }
        )*
    };
}

impl_sub_aggregations!(
    TermsAggregation,
    HistogramAggregation,
    DateHistogramAggregation,
    GeohashGridAggregation,
    FilterAggregation,
);

pub fn stats(name: impl Into<String>, field: impl Into<String>) -> MetricAggregation {
    MetricAggregation::new(name, Metric::Stats, field)
}

pub fn extended_stats(name: impl Into<String>, field: impl Into<String>) -> MetricAggregation {
    MetricAggregation::new(name, Metric::ExtendedStats, field)
}

pub fn avg(name: impl Into<String>, field: impl Into<String>) -> MetricAggregation {
    MetricAggregation::new(name, Metric::Avg, field)
}

pub fn geo_centroid(name: impl Into<String>, field: impl Into<String>) -> MetricAggregation {
    MetricAggregation::new(name, Metric::GeoCentroid, field)
}

pub fn percentiles(name: impl Into<String>, field: impl Into<String>) -> PercentilesAggregation {
    PercentilesAggregation::new(name, field)
}

pub fn terms(name: impl Into<String>, field: impl Into<String>) -> TermsAggregation {
    TermsAggregation::new(name, field)
}

pub fn histogram(name: impl Into<String>, field: impl Into<String>, interval: f64) -> HistogramAggregation {
    HistogramAggregation::new(name, field, interval)
}

pub fn date_histogram(name: impl Into<String>, field: impl Into<String>) -> DateHistogramAggregation {
    DateHistogramAggregation::new(name, field)
}

pub fn geohash_grid(name: impl Into<String>, field: impl Into<String>) -> GeohashGridAggregation {
    GeohashGridAggregation::new(name, field)
}

pub fn filter(name: impl Into<String>, filter: impl Into<Query>) -> FilterAggregation {
    FilterAggregation::new(name, filter)
}

/// `{kind: body, aggregations?: {...}}`
pub(crate) fn serialize_body<S, T>(
    serializer: S,
    kind: &str,
    body: &T,
    aggregations: Option<&SubAggregations>,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + ?Sized,
{
    use serde::ser::SerializeMap;

    let aggregations = aggregations.filter(|a| !a.is_empty());
    let mut map = serializer.serialize_map(Some(1 + usize::from(aggregations.is_some())))?;
    map.serialize_entry(kind, body)?;
    if let Some(aggregations) = aggregations {
        map.serialize_entry("aggregations", aggregations)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;
    use serde_json::json;

    #[test]
    fn test_distinct_sub_aggregations_both_kept() {
        let agg = terms("by_city", "city")
            .sub_aggregation(avg("avg_price", "price"))
            .sub_aggregation(stats("area_stats", "area"));
        let v = serde_json::to_value(Aggregation::from(agg)).unwrap();
        assert_eq!(
            v,
            json!({
                "terms": {"field": "city", "size": 10},
                "aggregations": {
                    "avg_price": {"avg": {"field": "price"}},
                    "area_stats": {"stats": {"field": "area"}}
                }
            })
        );
    }

    #[test]
    fn test_same_name_later_wins_siblings_stay() {
        let agg = geohash_grid("grid", "location")
            .precision(5)
            .sub_aggregation(avg("price", "price"))
            .sub_aggregation(geo_centroid("center", "location"))
            .sub_aggregation(extended_stats("price", "price"));
        let v = serde_json::to_value(Aggregation::from(agg)).unwrap();
        assert_eq!(
            v["aggregations"],
            json!({
                "price": {"extended_stats": {"field": "price"}},
                "center": {"geo_centroid": {"field": "location"}}
            })
        );
    }

    #[test]
    fn test_no_aggregations_key_without_children() {
        let v = serde_json::to_value(Aggregation::from(filter("active", query::term("status", "active")))).unwrap();
        assert_eq!(v, json!({"filter": {"term": {"status": {"value": "active"}}}}));
    }

    #[test]
    fn test_named_value() {
        let agg: Aggregation = stats("price_stats", "price").into();
        assert_eq!(agg.to_named_value().unwrap(), json!({"price_stats": {"stats": {"field": "price"}}}));

        let agg: Aggregation = stats("price_stats", "").into();
        assert!(matches!(agg.to_named_value(), Err(Error::MissingField(_))));
    }

    #[test]
    fn test_validate_missing_field_and_name() {
        let agg: Aggregation = terms("by_status", "").into();
        assert!(matches!(agg.validate(), Err(Error::MissingField(f)) if f == "terms.field"));

        let agg: Aggregation = stats("", "price").into();
        assert!(matches!(agg.validate(), Err(Error::MissingField(f)) if f == "stats.name"));
    }

    #[test]
    fn test_validate_recurses_into_children() {
        let agg: Aggregation = terms("by_status", "status")
            .sub_aggregation(filter("cheap", query::range("").lt(10)))
            .into();
        assert!(matches!(agg.validate(), Err(Error::MissingField(f)) if f == "range.field"));
    }

    #[test]
    fn test_sub_aggregations_from_iter_and_extend() {
        let mut a: SubAggregations = vec![Aggregation::from(avg("x", "f1")), stats("y", "f2").into()]
            .into_iter()
            .collect();
        let b: SubAggregations = vec![Aggregation::from(stats("x", "f3"))].into_iter().collect();
        a.extend(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("x").map(Aggregation::kind), Some("stats"));
        assert_eq!(a.names().collect::<Vec<_>>(), vec!["x", "y"]);
    }
}
