//! Bucket aggregations

use super::{serialize_body, SubAggregations};
use crate::error::Error;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Buckets per distinct field value
#[derive(Debug, Clone, PartialEq)]
pub struct TermsAggregation {
    pub name: String,
    pub field: String,
    pub size: usize,
    pub aggregations: SubAggregations,
}

impl TermsAggregation {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            size: 10,
            aggregations: SubAggregations::new(),
        }
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

impl Serialize for TermsAggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            field: &'a str,
            size: usize,
        }
        serialize_body(
            serializer,
            "terms",
            &Body {
                field: &self.field,
                size: self.size,
            },
            Some(&self.aggregations),
        )
    }
}

/// Fixed-width numeric buckets
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramAggregation {
    pub name: String,
    pub field: String,
    pub interval: f64,
    pub min_doc_count: u64,
    pub aggregations: SubAggregations,
}

impl HistogramAggregation {
    pub fn new(name: impl Into<String>, field: impl Into<String>, interval: f64) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            interval,
            min_doc_count: 0,
            aggregations: SubAggregations::new(),
        }
    }

    pub fn interval(mut self, interval: f64) -> Self {
        self.interval = interval;
        self
    }

    pub fn min_doc_count(mut self, min_doc_count: u64) -> Self {
        self.min_doc_count = min_doc_count;
        self
    }
}

impl Serialize for HistogramAggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            field: &'a str,
            interval: f64,
            min_doc_count: u64,
        }
        serialize_body(
            serializer,
            "histogram",
            &Body {
                field: &self.field,
                interval: self.interval,
                min_doc_count: self.min_doc_count,
            },
            Some(&self.aggregations),
        )
    }
}

/// Calendar-aware interval for date histograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarInterval {
    Second,
    Minute,
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl CalendarInterval {
    pub const ALL: [CalendarInterval; 8] = [
        CalendarInterval::Second,
        CalendarInterval::Minute,
        CalendarInterval::Hour,
        CalendarInterval::Day,
        CalendarInterval::Week,
        CalendarInterval::Month,
        CalendarInterval::Quarter,
        CalendarInterval::Year,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CalendarInterval::Second => "1s",
            CalendarInterval::Minute => "1m",
            CalendarInterval::Hour => "1h",
            CalendarInterval::Day => "1d",
            CalendarInterval::Week => "1w",
            CalendarInterval::Month => "1M",
            CalendarInterval::Quarter => "1q",
            CalendarInterval::Year => "1y",
        }
    }
}

impl FromStr for CalendarInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalendarInterval::ALL
            .into_iter()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| Error::invalid("calendar interval", s))
    }
}

impl fmt::Display for CalendarInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CalendarInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Date buckets on calendar boundaries
#[derive(Debug, Clone, PartialEq)]
pub struct DateHistogramAggregation {
    pub name: String,
    pub field: String,
    pub calendar_interval: CalendarInterval,
    pub min_doc_count: u64,
    pub aggregations: SubAggregations,
}

impl DateHistogramAggregation {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            calendar_interval: CalendarInterval::default(),
            min_doc_count: 0,
            aggregations: SubAggregations::new(),
        }
    }

    pub fn calendar_interval(mut self, interval: CalendarInterval) -> Self {
        self.calendar_interval = interval;
        self
    }

    pub fn min_doc_count(mut self, min_doc_count: u64) -> Self {
        self.min_doc_count = min_doc_count;
        self
    }
}

impl Serialize for DateHistogramAggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            field: &'a str,
            calendar_interval: CalendarInterval,
            min_doc_count: u64,
        }
        serialize_body(
            serializer,
            "date_histogram",
            &Body {
                field: &self.field,
                calendar_interval: self.calendar_interval,
                min_doc_count: self.min_doc_count,
            },
            Some(&self.aggregations),
        )
    }
}

/// Geohash cell buckets; precision is left to the engine default when unset
#[derive(Debug, Clone, PartialEq)]
pub struct GeohashGridAggregation {
    pub name: String,
    pub field: String,
    pub precision: Option<u8>,
    pub aggregations: SubAggregations,
}

impl GeohashGridAggregation {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            precision: None,
            aggregations: SubAggregations::new(),
        }
    }

    pub fn precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }
}

impl Serialize for GeohashGridAggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            field: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            precision: Option<u8>,
        }
        serialize_body(
            serializer,
            "geohash_grid",
            &Body {
                field: &self.field,
                precision: self.precision,
            },
            Some(&self.aggregations),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{percentiles, Aggregation};
    use serde_json::{json, Value};

    fn to_json(agg: impl Into<Aggregation>) -> Value {
        serde_json::to_value(agg.into()).unwrap()
    }

    #[test]
    fn test_terms_defaults() {
        assert_eq!(
            to_json(TermsAggregation::new("by_status", "status")),
            json!({"terms": {"field": "status", "size": 10}})
        );
        assert_eq!(
            to_json(TermsAggregation::new("by_status", "status").size(50)),
            json!({"terms": {"field": "status", "size": 50}})
        );
    }

    #[test]
    fn test_histogram() {
        assert_eq!(
            to_json(HistogramAggregation::new("prices", "price", 50.0).min_doc_count(1)),
            json!({"histogram": {"field": "price", "interval": 50.0, "min_doc_count": 1}})
        );
    }

    #[test]
    fn test_date_histogram_defaults_and_children() {
        let agg = DateHistogramAggregation::new("per_month", "created_at")
            .calendar_interval(CalendarInterval::Month)
            .sub_aggregation(percentiles("load", "load_time").percents([95.0, 99.0]));
        assert_eq!(
            to_json(agg),
            json!({
                "date_histogram": {"field": "created_at", "calendar_interval": "1M", "min_doc_count": 0},
                "aggregations": {
                    "load": {"percentiles": {
                        "field": "load_time",
                        "percents": [95.0, 99.0],
                        "tdigest": {"compression": 100.0},
                        "keyed": true
                    }}
                }
            })
        );
        assert_eq!(
            to_json(DateHistogramAggregation::new("per_day", "ts")),
            json!({"date_histogram": {"field": "ts", "calendar_interval": "1d", "min_doc_count": 0}})
        );
    }

    #[test]
    fn test_calendar_interval_parse() {
        assert_eq!("1q".parse::<CalendarInterval>().unwrap(), CalendarInterval::Quarter);
        assert!(matches!(
            "2d".parse::<CalendarInterval>(),
            Err(Error::InvalidEnumValue { kind: "calendar interval", .. })
        ));
    }

    #[test]
    fn test_geohash_grid_precision_optional() {
        assert_eq!(
            to_json(GeohashGridAggregation::new("grid", "location")),
            json!({"geohash_grid": {"field": "location"}})
        );
        assert_eq!(
            to_json(GeohashGridAggregation::new("grid", "location").precision(7)),
            json!({"geohash_grid": {"field": "location", "precision": 7}})
        );
    }
}
