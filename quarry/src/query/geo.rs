//! Geo clauses

use super::{require_field, serialize_tagged, FieldClause};
use crate::error::Error;
use crate::geo::{Distance, GeoPoint};
use crate::Result;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::str::FromStr;

/// Documents within `distance` of `point`
#[derive(Debug, Clone, PartialEq)]
pub struct GeoDistanceQuery {
    pub field: String,
    pub point: GeoPoint,
    pub distance: Distance,
}

impl GeoDistanceQuery {
    pub fn new(field: impl Into<String>, point: GeoPoint, distance: Distance) -> Self {
        Self {
            field: field.into(),
            point,
            distance,
        }
    }

    pub fn point(mut self, point: GeoPoint) -> Self {
        self.point = point;
        self
    }

    pub fn distance(mut self, distance: Distance) -> Self {
        self.distance = distance;
        self
    }
}

impl Serialize for GeoDistanceQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Body<'a>(&'a GeoDistanceQuery);

        impl Serialize for Body<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("distance", &self.0.distance)?;
                map.serialize_entry(&self.0.field, &self.0.point.to_lat_lon_string())?;
                map.end()
            }
        }

        serialize_tagged(serializer, "geo_distance", &Body(self))
    }
}

/// Named corner of a bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Corner::TopLeft => "top_left",
            Corner::TopRight => "top_right",
            Corner::BottomLeft => "bottom_left",
            Corner::BottomRight => "bottom_right",
        }
    }
}

impl FromStr for Corner {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Corner::ALL
            .into_iter()
            .find(|corner| corner.as_str() == s)
            .ok_or_else(|| Error::invalid("bounding box corner", s))
    }
}

/// Documents inside a box. Corners are independently optional and only the
/// ones set are sent; at least one is required.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoBoundingBoxQuery {
    pub field: String,
    pub top_left: Option<GeoPoint>,
    pub top_right: Option<GeoPoint>,
    pub bottom_left: Option<GeoPoint>,
    pub bottom_right: Option<GeoPoint>,
}

impl GeoBoundingBoxQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            top_left: None,
            top_right: None,
            bottom_left: None,
            bottom_right: None,
        }
    }

    pub fn set_corner(mut self, corner: Corner, point: GeoPoint) -> Self {
        let slot = match corner {
            Corner::TopLeft => &mut self.top_left,
            Corner::TopRight => &mut self.top_right,
            Corner::BottomLeft => &mut self.bottom_left,
            Corner::BottomRight => &mut self.bottom_right,
        };
        *slot = Some(point);
        self
    }

    /// Set a corner by name; anything but the four corner names is rejected
    pub fn corner(self, name: &str, point: GeoPoint) -> Result<Self> {
        Ok(self.set_corner(name.parse()?, point))
    }

    pub fn top_left(self, point: GeoPoint) -> Self {
        self.set_corner(Corner::TopLeft, point)
    }

    pub fn top_right(self, point: GeoPoint) -> Self {
        self.set_corner(Corner::TopRight, point)
    }

    pub fn bottom_left(self, point: GeoPoint) -> Self {
        self.set_corner(Corner::BottomLeft, point)
    }

    pub fn bottom_right(self, point: GeoPoint) -> Self {
        self.set_corner(Corner::BottomRight, point)
    }

    pub fn get(&self, corner: Corner) -> Option<GeoPoint> {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomLeft => self.bottom_left,
            Corner::BottomRight => self.bottom_right,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require_field(&self.field, "geo_bounding_box")?;
        if Corner::ALL.iter().all(|c| self.get(*c).is_none()) {
            return Err(Error::missing("geo_bounding_box.corner"));
        }
        Ok(())
    }
}

impl Serialize for GeoBoundingBoxQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Corners<'a>(&'a GeoBoundingBoxQuery);

        impl Serialize for Corners<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(None)?;
                for corner in Corner::ALL {
                    if let Some(point) = self.0.get(corner) {
                        map.serialize_entry(corner.as_str(), &point)?;
                    }
                }
                map.end()
            }
        }

        serialize_tagged(serializer, "geo_bounding_box", &FieldClause(&self.field, &Corners(self)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use serde_json::json;

    #[test]
    fn test_geo_distance_shape() {
        let q = GeoDistanceQuery::new("location", GeoPoint::new(40.37, 49.83), Distance::km(0.5));
        assert_eq!(
            Query::from(q).to_value().unwrap(),
            json!({"geo_distance": {"distance": "0.5km", "location": "40.37,49.83"}})
        );
    }

    #[test]
    fn test_bounding_box_only_set_corners() {
        let q = GeoBoundingBoxQuery::new("location")
            .top_left(GeoPoint::new(40.73, -74.1))
            .bottom_right(GeoPoint::new(40.01, -71.12));
        assert_eq!(
            Query::from(q).to_value().unwrap(),
            json!({"geo_bounding_box": {"location": {
                "top_left": {"lat": 40.73, "lon": -74.1},
                "bottom_right": {"lat": 40.01, "lon": -71.12}
            }}})
        );
    }

    #[test]
    fn test_bounding_box_corner_by_name() {
        let q = GeoBoundingBoxQuery::new("location")
            .corner("top_right", GeoPoint::new(1.0, 2.0))
            .unwrap();
        assert_eq!(q.top_right, Some(GeoPoint::new(1.0, 2.0)));

        let err = GeoBoundingBoxQuery::new("location")
            .corner("middle", GeoPoint::new(1.0, 2.0))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEnumValue { kind: "bounding box corner", .. }));
    }

    #[test]
    fn test_bounding_box_requires_a_corner() {
        let q: Query = GeoBoundingBoxQuery::new("location").into();
        assert!(matches!(q.validate(), Err(Error::MissingField(f)) if f == "geo_bounding_box.corner"));
    }
}
