//! Caller filter maps
//!
//! Turns a loosely typed filter object, as received from an API caller, into
//! session clauses:
//!
//! ```json
//! {
//!   "exact":  {"status": "active", "tags": ["a", "b"]},
//!   "range":  {"price": {"gte": 100, "lt": 500}},
//!   "scroll": "<cursor from a previous page>"
//! }
//! ```
//!
//! - `exact` scalars become `term`, arrays become one `terms` (or one `term`
//!   per value for fields listed in [`FilterConfig::per_value_term_fields`])
//! - `range` bounds become one `range` clause per bound; unknown operators are rejected
//! - `scroll` is decoded into `search_after`; a malformed cursor is ignored
//!
//! All clauses go to `must`. Unknown top-level keys are skipped.

use crate::config::FilterConfig;
use crate::cursor;
use crate::query::{Query, RangeOp, RangeQuery, TermQuery, TermsQuery};
use crate::session::Session;
use crate::Result;
use serde_json::{Map, Value};
use tracing::debug;

/// Nothing is attached to the session unless the whole map is valid.
pub fn apply_filters(session: &mut Session<'_>, filters: &Value, config: &FilterConfig) -> Result<()> {
    let Some(filters) = filters.as_object() else {
        debug!("filter map is not an object, ignoring");
        return Ok(());
    };

    let mut clauses = Vec::new();
    let mut search_after = None;
    for (key, value) in filters {
        match key.as_str() {
            "exact" => {
                if let Some(exact) = value.as_object() {
                    clauses.extend(exact_clauses(exact, config));
                }
            }
            "range" => {
                if let Some(range) = value.as_object() {
                    clauses.extend(range_clauses(range)?);
                }
            }
            "scroll" => match value.as_str().and_then(cursor::decode) {
                Some(values) => search_after = Some(values),
                None => debug!("ignoring malformed scroll cursor"),
            },
            other => debug!(key = other, "ignoring unknown filter key"),
        }
    }

    for clause in clauses {
        session.must(clause);
    }
    if let Some(values) = search_after {
        session.search_after(values);
    }
    Ok(())
}

fn exact_clauses(exact: &Map<String, Value>, config: &FilterConfig) -> Vec<Query> {
    let mut clauses = Vec::new();
    for (field, value) in exact {
        match value {
            Value::Array(values) if config.per_value_term_fields.iter().any(|f| f == field) => {
                clauses.extend(
                    values
                        .iter()
                        .map(|value| TermQuery::new(field.clone(), value.clone()).into()),
                );
            }
            Value::Array(values) => {
                clauses.push(TermsQuery::new(field.clone(), values.iter().cloned()).into());
            }
            scalar => clauses.push(TermQuery::new(field.clone(), scalar.clone()).into()),
        }
    }
    clauses
}

fn range_clauses(range: &Map<String, Value>) -> Result<Vec<Query>> {
    let mut clauses = Vec::new();
    for (field, bounds) in range {
        let Some(bounds) = bounds.as_object() else {
            continue;
        };
        for (op, value) in bounds {
            let op: RangeOp = op.parse()?;
            clauses.push(RangeQuery::new(field.clone()).apply(op, value.clone()).into());
        }
    }
    Ok(clauses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SearchBackend;
    use crate::error::Error;
    use crate::session::SessionState;
    use crate::request::{CountRequest, ScrollRequest, SearchRequest};
    use crate::response::{CountResponse, SearchResponse};
    use async_trait::async_trait;
    use serde_json::json;

    struct Unused;

    #[async_trait]
    impl SearchBackend for Unused {
        async fn search(&self, _: &SearchRequest) -> Result<SearchResponse> {
            unreachable!()
        }

        async fn scroll(&self, _: &ScrollRequest) -> Result<SearchResponse> {
            unreachable!()
        }

        async fn count(&self, _: &CountRequest) -> Result<CountResponse> {
            unreachable!()
        }
    }

    #[test]
    fn test_exact_scalars_and_arrays() {
        let mut session = Session::new(&Unused, "flats");
        apply_filters(
            &mut session,
            &json!({"exact": {"status": "active", "rooms": [1, 2]}, "poi": 5}),
            &FilterConfig::default(),
        )
        .unwrap();
        assert_eq!(
            session.body().to_value(),
            json!({"query": {"bool": {"must": [
                {"terms": {"rooms": [1, 2]}},
                {"term": {"status": {"value": "active"}}}
            ]}}})
        );
    }

    #[test]
    fn test_per_value_term_fields() {
        let mut session = Session::new(&Unused, "flats");
        let config = FilterConfig {
            per_value_term_fields: vec!["amenity".to_string()],
        };
        apply_filters(&mut session, &json!({"exact": {"amenity": ["pool", "gym"]}}), &config).unwrap();
        assert_eq!(
            session.body().to_value(),
            json!({"query": {"bool": {"must": [
                {"term": {"amenity": {"value": "pool"}}},
                {"term": {"amenity": {"value": "gym"}}}
            ]}}})
        );
    }

    #[test]
    fn test_range_and_bad_operator() {
        let mut session = Session::new(&Unused, "flats");
        apply_filters(&mut session, &json!({"range": {"price": {"gte": 100}}}), &FilterConfig::default()).unwrap();
        assert_eq!(
            session.body().to_value(),
            json!({"query": {"bool": {"must": [{"range": {"price": {"gte": 100}}}]}}})
        );

        let err = apply_filters(
            &mut session,
            &json!({"range": {"price": {"between": 1}}}),
            &FilterConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidEnumValue { kind: "range operator", .. }));
    }

    #[test]
    fn test_bad_operator_leaves_session_untouched() {
        let mut session = Session::new(&Unused, "flats");
        let err = apply_filters(
            &mut session,
            &json!({
                "exact": {"status": "active"},
                "range": {"age": {"gte": 18, "sideways": 3}},
                "scroll": cursor::encode(&[json!(7)])
            }),
            &FilterConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidEnumValue { kind: "range operator", .. }));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.body().is_empty());
    }

    #[test]
    fn test_scroll_cursor() {
        let mut session = Session::new(&Unused, "flats");
        let token = cursor::encode(&[json!(1700000000), json!(42)]);
        apply_filters(&mut session, &json!({"scroll": token}), &FilterConfig::default()).unwrap();
        assert_eq!(session.body().search_after, vec![json!(1700000000), json!(42)]);

        let mut session = Session::new(&Unused, "flats");
        apply_filters(&mut session, &json!({"scroll": "%%%"}), &FilterConfig::default()).unwrap();
        assert!(session.body().is_empty());
    }
}
