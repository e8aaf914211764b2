//! Leaf clauses: term-level and full-text queries

use super::{serialize_tagged, FieldClause};
use crate::error::Error;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Matches every document; serializes to `{"match_all": {}}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchAllQuery {
    pub boost: Option<f64>,
}

impl MatchAllQuery {
    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl Serialize for MatchAllQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut body = Map::new();
        if let Some(boost) = self.boost {
            body.insert("boost".to_string(), boost.into());
        }
        serialize_tagged(serializer, "match_all", &body)
    }
}

/// Exact value on a single field
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    pub field: String,
    pub value: Value,
    pub boost: Option<f64>,
}

impl TermQuery {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

#[derive(Serialize)]
struct TermValue<'a> {
    value: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    boost: Option<f64>,
}

/// Always the long form `{"term": {field: {"value": v}}}`
impl Serialize for TermQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = TermValue {
            value: &self.value,
            boost: self.boost,
        };
        serialize_tagged(serializer, "term", &FieldClause(&self.field, &body))
    }
}

/// Any of several exact values on a single field
#[derive(Debug, Clone, PartialEq)]
pub struct TermsQuery {
    pub field: String,
    pub values: Vec<Value>,
}

impl TermsQuery {
    pub fn new<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Serialize for TermsQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_tagged(serializer, "terms", &FieldClause(&self.field, &self.values))
    }
}

/// Boolean operator joining analyzed terms of a `match` query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(Operator::And),
            "or" => Ok(Operator::Or),
            other => Err(Error::invalid("match operator", other)),
        }
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Edit distance allowed when matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fuzziness {
    Auto,
    /// `AUTO:low,high` term-length thresholds
    AutoRange(u8, u8),
    Edits(u8),
}

impl Default for Fuzziness {
    fn default() -> Self {
        Fuzziness::AutoRange(3, 7)
    }
}

impl fmt::Display for Fuzziness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fuzziness::Auto => f.write_str("AUTO"),
            Fuzziness::AutoRange(low, high) => write!(f, "AUTO:{},{}", low, high),
            Fuzziness::Edits(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for Fuzziness {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Analyzed full-text match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub field: String,
    pub query: String,
    pub operator: Option<Operator>,
    pub fuzziness: Option<Fuzziness>,
    pub boost: Option<f64>,
}

impl MatchQuery {
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            operator: None,
            fuzziness: None,
            boost: None,
        }
    }

    pub fn operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Operator given as text; only `and` and `or` are accepted
    pub fn operator_str(self, operator: &str) -> crate::Result<Self> {
        Ok(self.operator(operator.parse()?))
    }

    pub fn fuzziness(mut self, fuzziness: Fuzziness) -> Self {
        self.fuzziness = Some(fuzziness);
        self
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

#[derive(Serialize)]
struct MatchBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    operator: Option<Operator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    boost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fuzziness: Option<Fuzziness>,
}

impl Serialize for MatchQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = MatchBody {
            query: &self.query,
            operator: self.operator,
            boost: self.boost,
            fuzziness: self.fuzziness,
        };
        serialize_tagged(serializer, "match", &FieldClause(&self.field, &body))
    }
}

#[derive(Serialize)]
struct PhraseBody<'a> {
    query: &'a str,
    boost: f64,
}

fn serialize_phrase<S: Serializer>(
    serializer: S,
    tag: &str,
    field: &str,
    query: &str,
    boost: Option<f64>,
) -> Result<S::Ok, S::Error> {
    match boost {
        Some(boost) => serialize_tagged(serializer, tag, &FieldClause(field, &PhraseBody { query, boost })),
        None => serialize_tagged(serializer, tag, &FieldClause(field, query)),
    }
}

/// Exact phrase match
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPhraseQuery {
    pub field: String,
    pub query: String,
    pub boost: Option<f64>,
}

impl MatchPhraseQuery {
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl Serialize for MatchPhraseQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_phrase(serializer, "match_phrase", &self.field, &self.query, self.boost)
    }
}

/// Phrase match where the last term is a prefix (search-as-you-type)
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPhrasePrefixQuery {
    pub field: String,
    pub query: String,
    pub boost: Option<f64>,
}

impl MatchPhrasePrefixQuery {
    pub fn new(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            query: query.into(),
            boost: None,
        }
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }
}

impl Serialize for MatchPhrasePrefixQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_phrase(serializer, "match_phrase_prefix", &self.field, &self.query, self.boost)
    }
}

/// Documents that have any value for the field
#[derive(Debug, Clone, PartialEq)]
pub struct ExistsQuery {
    pub field: String,
}

impl ExistsQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl Serialize for ExistsQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            field: &'a str,
        }
        serialize_tagged(serializer, "exists", &Body { field: &self.field })
    }
}

/// Range bound operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeOp {
    Gte,
    Gt,
    Lte,
    Lt,
}

impl RangeOp {
    pub const ALL: [RangeOp; 4] = [RangeOp::Gte, RangeOp::Gt, RangeOp::Lte, RangeOp::Lt];

    pub const fn as_str(self) -> &'static str {
        match self {
            RangeOp::Gte => "gte",
            RangeOp::Gt => "gt",
            RangeOp::Lte => "lte",
            RangeOp::Lt => "lt",
        }
    }
}

impl FromStr for RangeOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangeOp::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| Error::invalid("range operator", s))
    }
}

impl fmt::Display for RangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounded range on a single field. Only the bounds actually set are sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    pub field: String,
    pub gte: Option<Value>,
    pub gt: Option<Value>,
    pub lte: Option<Value>,
    pub lt: Option<Value>,
    pub boost: Option<f64>,
}

impl RangeQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            gte: None,
            gt: None,
            lte: None,
            lt: None,
            boost: None,
        }
    }

    /// Set one bound by operator
    pub fn apply(mut self, op: RangeOp, value: impl Into<Value>) -> Self {
        let value = Some(value.into());
        match op {
            RangeOp::Gte => self.gte = value,
            RangeOp::Gt => self.gt = value,
            RangeOp::Lte => self.lte = value,
            RangeOp::Lt => self.lt = value,
        }
        self
    }

    /// Set one bound from an operator name; unknown names are rejected
    pub fn apply_str(self, op: &str, value: impl Into<Value>) -> crate::Result<Self> {
        Ok(self.apply(op.parse()?, value))
    }

    pub fn gte(self, value: impl Into<Value>) -> Self {
        self.apply(RangeOp::Gte, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Self {
        self.apply(RangeOp::Gt, value)
    }

    pub fn lte(self, value: impl Into<Value>) -> Self {
        self.apply(RangeOp::Lte, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Self {
        self.apply(RangeOp::Lt, value)
    }

    pub fn boost(mut self, boost: f64) -> Self {
        self.boost = Some(boost);
        self
    }

    pub fn bound(&self, op: RangeOp) -> Option<&Value> {
        match op {
            RangeOp::Gte => self.gte.as_ref(),
            RangeOp::Gt => self.gt.as_ref(),
            RangeOp::Lte => self.lte.as_ref(),
            RangeOp::Lt => self.lt.as_ref(),
        }
    }
}

impl Serialize for RangeQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut bounds = Map::new();
        for op in RangeOp::ALL {
            if let Some(value) = self.bound(op) {
                bounds.insert(op.as_str().to_string(), value.clone());
            }
        }
        if let Some(boost) = self.boost {
            bounds.insert("boost".to_string(), boost.into());
        }
        serialize_tagged(serializer, "range", &FieldClause(&self.field, &bounds))
    }
}
