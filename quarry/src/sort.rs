//! Sort criteria
//!
//! Three kinds are supported, all defaulting to descending order:
//! - field sort: `{"price": {"order": "asc"}}`
//! - geo distance sort: `{"_geo_distance": {"location": {"lat", "lon"}, "order", "unit"}}`
//! - script sort: `{"_script": {"order", "type", "script": {"lang": "painless", "source"}}}`

use crate::error::Error;
use crate::geo::{DistanceUnit, GeoPoint};
use crate::query::{serialize_tagged, FieldClause};
use crate::Result;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const SCRIPT_LANG: &str = "painless";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::invalid("sort order", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SortOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Declared value type of a script sort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptSortType {
    Number,
    String,
}

impl ScriptSortType {
    pub const fn as_str(self) -> &'static str {
        match self {
            ScriptSortType::Number => "number",
            ScriptSortType::String => "string",
        }
    }
}

impl FromStr for ScriptSortType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "number" => Ok(ScriptSortType::Number),
            "string" => Ok(ScriptSortType::String),
            other => Err(Error::invalid("script sort type", other)),
        }
    }
}

impl Serialize for ScriptSortType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One sort criterion
#[derive(Debug, Clone, PartialEq)]
pub enum Sort {
    Field(FieldSort),
    GeoDistance(GeoDistanceSort),
    Script(ScriptSort),
}

impl Sort {
    pub fn order(&self) -> SortOrder {
        match self {
            Sort::Field(s) => s.order,
            Sort::GeoDistance(s) => s.order,
            Sort::Script(s) => s.order,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (value, name) = match self {
            Sort::Field(s) => (&s.field, "sort.field"),
            Sort::GeoDistance(s) => (&s.field, "_geo_distance.field"),
            Sort::Script(s) => (&s.script, "_script.source"),
        };
        if value.trim().is_empty() {
            return Err(Error::missing(name));
        }
        Ok(())
    }
}

impl Serialize for Sort {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Sort::Field(s) => s.serialize(serializer),
            Sort::GeoDistance(s) => s.serialize(serializer),
            Sort::Script(s) => s.serialize(serializer),
        }
    }
}

impl From<FieldSort> for Sort {
    fn from(sort: FieldSort) -> Self {
        Sort::Field(sort)
    }
}

impl From<GeoDistanceSort> for Sort {
    fn from(sort: GeoDistanceSort) -> Self {
        Sort::GeoDistance(sort)
    }
}

impl From<ScriptSort> for Sort {
    fn from(sort: ScriptSort) -> Self {
        Sort::Script(sort)
    }
}

#[derive(Serialize)]
struct OrderBody {
    order: SortOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSort {
    pub field: String,
    pub order: SortOrder,
}

impl FieldSort {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::default(),
        }
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Order by name; anything but `asc`/`desc` is rejected
    pub fn order_str(self, order: &str) -> Result<Self> {
        Ok(self.order(order.parse()?))
    }
}

impl Serialize for FieldSort {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        FieldClause(&self.field, &OrderBody { order: self.order }).serialize(serializer)
    }
}

/// Orders by distance from a fixed point
#[derive(Debug, Clone, PartialEq)]
pub struct GeoDistanceSort {
    pub field: String,
    pub point: GeoPoint,
    pub order: SortOrder,
    pub unit: DistanceUnit,
}

impl GeoDistanceSort {
    pub fn new(field: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            field: field.into(),
            point,
            order: SortOrder::default(),
            unit: DistanceUnit::default(),
        }
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn order_str(self, order: &str) -> Result<Self> {
        Ok(self.order(order.parse()?))
    }

    pub fn unit(mut self, unit: DistanceUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Unit by abbreviation (`in yd ft km NM mm cm mi m`)
    pub fn unit_str(self, unit: &str) -> Result<Self> {
        Ok(self.unit(unit.parse()?))
    }
}

impl Serialize for GeoDistanceSort {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Body<'a>(&'a GeoDistanceSort);

        impl Serialize for Body<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry(&self.0.field, &self.0.point)?;
                map.serialize_entry("order", &self.0.order)?;
                map.serialize_entry("unit", &self.0.unit)?;
                map.end()
            }
        }

        serialize_tagged(serializer, "_geo_distance", &Body(self))
    }
}

/// Orders by the value a painless script computes per document
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSort {
    pub script: String,
    pub sort_type: ScriptSortType,
    pub order: SortOrder,
}

impl ScriptSort {
    pub fn new(script: impl Into<String>, sort_type: ScriptSortType) -> Self {
        Self {
            script: script.into(),
            sort_type,
            order: SortOrder::default(),
        }
    }

    /// Value type by name; anything but `number`/`string` is rejected
    pub fn with_type_str(script: impl Into<String>, sort_type: &str) -> Result<Self> {
        Ok(Self::new(script, sort_type.parse()?))
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn order_str(self, order: &str) -> Result<Self> {
        Ok(self.order(order.parse()?))
    }
}

impl Serialize for ScriptSort {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Script<'a> {
            lang: &'static str,
            source: &'a str,
        }

        #[derive(Serialize)]
        struct Body<'a> {
            order: SortOrder,
            #[serde(rename = "type")]
            sort_type: ScriptSortType,
            script: Script<'a>,
        }

        serialize_tagged(
            serializer,
            "_script",
            &Body {
                order: self.order,
                sort_type: self.sort_type,
                script: Script {
                    lang: SCRIPT_LANG,
                    source: &self.script,
                },
            },
        )
    }
}

pub fn field_sort(field: impl Into<String>) -> FieldSort {
    FieldSort::new(field)
}

pub fn geo_distance_sort(field: impl Into<String>, point: GeoPoint) -> GeoDistanceSort {
    GeoDistanceSort::new(field, point)
}

pub fn script_sort(script: impl Into<String>, sort_type: ScriptSortType) -> ScriptSort {
    ScriptSort::new(script, sort_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_json(sort: impl Into<Sort>) -> serde_json::Value {
        serde_json::to_value(sort.into()).unwrap()
    }

    #[test]
    fn test_field_sort_defaults_to_desc() {
        assert_eq!(to_json(field_sort("created_at")), json!({"created_at": {"order": "desc"}}));
        assert_eq!(
            to_json(field_sort("price").order(SortOrder::Asc)),
            json!({"price": {"order": "asc"}})
        );
    }

    #[test]
    fn test_bad_order_rejected() {
        let err = field_sort("age").order_str("sideways").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidEnumValue { kind: "sort order", ref value } if value == "sideways"
        ));
        assert!(script_sort("doc['a'].value", ScriptSortType::Number)
            .order_str("up")
            .is_err());
    }

    #[test]
    fn test_geo_distance_sort() {
        let sort = geo_distance_sort("location", GeoPoint::new(40.4, 49.8))
            .order(SortOrder::Asc)
            .unit_str("km")
            .unwrap();
        assert_eq!(
            to_json(sort),
            json!({"_geo_distance": {
                "location": {"lat": 40.4, "lon": 49.8},
                "order": "asc",
                "unit": "km"
            }})
        );
    }

    #[test]
    fn test_geo_distance_sort_default_unit_and_bad_unit() {
        let v = to_json(geo_distance_sort("pin", GeoPoint::new(0.0, 0.0)));
        assert_eq!(v["_geo_distance"]["unit"], "m");
        assert_eq!(v["_geo_distance"]["order"], "desc");

        for unit in ["in", "yd", "ft", "km", "NM", "mm", "cm", "mi", "m"] {
            assert!(geo_distance_sort("pin", GeoPoint::new(0.0, 0.0)).unit_str(unit).is_ok());
        }
        let err = geo_distance_sort("pin", GeoPoint::new(0.0, 0.0))
            .unit_str("parsec")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEnumValue { kind: "distance unit", .. }));
    }

    #[test]
    fn test_script_sort() {
        let sort = script_sort("doc['price'].value * 2", ScriptSortType::Number);
        assert_eq!(
            to_json(sort),
            json!({"_script": {
                "order": "desc",
                "type": "number",
                "script": {"lang": "painless", "source": "doc['price'].value * 2"}
            }})
        );
    }

    #[test]
    fn test_script_sort_type_restricted() {
        assert!(ScriptSort::with_type_str("x", "string").is_ok());
        let err = ScriptSort::with_type_str("x", "date").unwrap_err();
        assert!(matches!(err, Error::InvalidEnumValue { kind: "script sort type", .. }));
    }

    #[test]
    fn test_validate() {
        assert!(Sort::from(field_sort("a")).validate().is_ok());
        assert!(matches!(
            Sort::from(field_sort("")).validate(),
            Err(Error::MissingField(f)) if f == "sort.field"
        ));
        assert!(matches!(
            Sort::from(script_sort(" ", ScriptSortType::String)).validate(),
            Err(Error::MissingField(f)) if f == "_script.source"
        ));
    }
}
