//! Geo primitives shared by geo queries and geo-distance sorting

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `"lat,lon"` string form accepted by geo_distance
    pub fn to_lat_lon_string(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

/// Distance units understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    Inch,
    Yard,
    Feet,
    Kilometers,
    NauticalMiles,
    Millimeters,
    Centimeters,
    Miles,
    #[default]
    Meters,
}

impl DistanceUnit {
    pub const ALL: [DistanceUnit; 9] = [
        DistanceUnit::Inch,
        DistanceUnit::Yard,
        DistanceUnit::Feet,
        DistanceUnit::Kilometers,
        DistanceUnit::NauticalMiles,
        DistanceUnit::Millimeters,
        DistanceUnit::Centimeters,
        DistanceUnit::Miles,
        DistanceUnit::Meters,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Inch => "in",
            DistanceUnit::Yard => "yd",
            DistanceUnit::Feet => "ft",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::NauticalMiles => "NM",
            DistanceUnit::Millimeters => "mm",
            DistanceUnit::Centimeters => "cm",
            DistanceUnit::Miles => "mi",
            DistanceUnit::Meters => "m",
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DistanceUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| Error::invalid("distance unit", s))
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DistanceUnit {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A distance such as `0.5km`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl Distance {
    pub fn new(value: f64, unit: DistanceUnit) -> Self {
        Self { value, unit }
    }

    pub fn km(value: f64) -> Self {
        Self::new(value, DistanceUnit::Kilometers)
    }

    pub fn meters(value: f64) -> Self {
        Self::new(value, DistanceUnit::Meters)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

impl FromStr for Distance {
    type Err = Error;

    /// Parses `"<number><unit>"`, e.g. `"0.5km"` or `"12NM"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| Error::invalid("distance unit", s))?;
        let (number, unit) = s.split_at(split);
        let value = number
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::invalid("distance", s))?;
        Ok(Self::new(value, unit.parse()?))
    }
}

impl Serialize for Distance {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
