//! Metric aggregations

use super::serialize_body;
use serde::{Serialize, Serializer};

/// Single-field metric kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Stats,
    ExtendedStats,
    Avg,
    GeoCentroid,
}

impl Metric {
    pub const fn as_str(self) -> &'static str {
        match self {
            Metric::Stats => "stats",
            Metric::ExtendedStats => "extended_stats",
            Metric::Avg => "avg",
            Metric::GeoCentroid => "geo_centroid",
        }
    }
}

/// `{<metric>: {field}}`
#[derive(Debug, Clone, PartialEq)]
pub struct MetricAggregation {
    pub name: String,
    pub metric: Metric,
    pub field: String,
}

impl MetricAggregation {
    pub fn new(name: impl Into<String>, metric: Metric, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metric,
            field: field.into(),
        }
    }
}

#[derive(Serialize)]
struct FieldBody<'a> {
    field: &'a str,
}

impl Serialize for MetricAggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_body(serializer, self.metric.as_str(), &FieldBody { field: &self.field }, None)
    }
}

/// Percentile estimates over a numeric field (t-digest)
#[derive(Debug, Clone, PartialEq)]
pub struct PercentilesAggregation {
    pub name: String,
    pub field: String,
    /// Empty means the engine's default percentiles
    pub percents: Vec<f64>,
    pub compression: f64,
    pub keyed: bool,
}

impl PercentilesAggregation {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            percents: Vec::new(),
            compression: 100.0,
            keyed: true,
        }
    }

    pub fn percents(mut self, percents: impl IntoIterator<Item = f64>) -> Self {
        self.percents = percents.into_iter().collect();
        self
    }

    pub fn compression(mut self, compression: f64) -> Self {
        self.compression = compression;
        self
    }

    pub fn keyed(mut self, keyed: bool) -> Self {
        self.keyed = keyed;
        self
    }
}

impl Serialize for PercentilesAggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct TDigest {
            compression: f64,
        }

        #[derive(Serialize)]
        struct Body<'a> {
            field: &'a str,
            #[serde(skip_serializing_if = "<[f64]>::is_empty")]
            percents: &'a [f64],
            tdigest: TDigest,
            keyed: bool,
        }

        serialize_body(
            serializer,
            "percentiles",
            &Body {
                field: &self.field,
                percents: &self.percents,
                tdigest: TDigest {
                    compression: self.compression,
                },
                keyed: self.keyed,
            },
            None,
        )
    }
}
