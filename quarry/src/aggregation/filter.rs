//! Filter aggregation

use super::{serialize_body, SubAggregations};
use crate::query::Query;
use serde::{Serialize, Serializer};

/// Narrows the document set to a query, then runs its children over it
#[derive(Debug, Clone, PartialEq)]
pub struct FilterAggregation {
    pub name: String,
    pub filter: Query,
    pub aggregations: SubAggregations,
}

impl FilterAggregation {
    pub fn new(name: impl Into<String>, filter: impl Into<Query>) -> Self {
        Self {
            name: name.into(),
            filter: filter.into(),
            aggregations: SubAggregations::new(),
        }
    }
}

impl Serialize for FilterAggregation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_body(serializer, "filter", &self.filter, Some(&self.aggregations))
    }
}
