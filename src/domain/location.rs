//! Postal address and geo coordinates of charging infrastructure

use crate::domain::{country::Country, identifiers::TimeZone};
use nutype::nutype;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Latitude in decimal degrees
#[nutype(
    validate(greater_or_equal = -90.0, less_or_equal = 90.0),
    derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, AsRef, Display)
)]
pub struct Latitude(f64);

/// Longitude in decimal degrees
#[nutype(
    validate(greater_or_equal = -180.0, less_or_equal = 180.0),
    derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, AsRef, Display)
)]
pub struct Longitude(f64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeoCoordinate {
    pub latitude: Latitude,
    pub longitude: Longitude,
}

impl GeoCoordinate {
    pub fn new(latitude: Latitude, longitude: Longitude) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Fixed six decimal places, the precision OICP transmits
impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6},{:.6}",
            self.latitude.into_inner(),
            self.longitude.into_inner()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub country: Country,
    pub city: String,
    pub street: String,
    pub postal_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<TimeZone>,
}

impl Address {
    pub fn new(
        country: Country,
        postal_code: impl Into<String>,
        city: impl Into<String>,
        street: impl Into<String>,
    ) -> Self {
        Self {
            country,
            city: city.into(),
            street: street.into(),
            postal_code: postal_code.into(),
            house_number: None,
            floor: None,
            region: None,
            time_zone: None,
        }
    }

    pub fn with_house_number(mut self, house_number: impl Into<String>) -> Self {
        self.house_number = Some(house_number.into());
        self
    }

    pub fn with_floor(mut self, floor: impl Into<String>) -> Self {
        self.floor = Some(floor.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = Some(time_zone);
        self
    }
}

/// `street house, floor, postal city, region, country`; absent parts stay empty
/// so that the text only changes when a field changes
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {}, {} {}, {}, {}",
            self.street,
            self.house_number.as_deref().unwrap_or_default(),
            self.floor.as_deref().unwrap_or_default(),
            self.postal_code,
            self.city,
            self.region.as_deref().unwrap_or_default(),
            self.country
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berlin() -> Address {
        Address::new(
            Country::from_alpha2("DE").unwrap(),
            "10115",
            "Berlin",
            "Invalidenstraße",
        )
        .with_house_number("117")
    }

    #[test]
    fn test_coordinate_ranges() {
        assert!(Latitude::try_new(90.0).is_ok());
        assert!(Latitude::try_new(90.1).is_err());
        assert!(Longitude::try_new(-180.0).is_ok());
        assert!(Longitude::try_new(-180.5).is_err());
    }

    #[test]
    fn test_coordinate_text_is_fixed_precision() {
        let geo = GeoCoordinate::new(
            Latitude::try_new(52.5).unwrap(),
            Longitude::try_new(13.4).unwrap(),
        );
        assert_eq!(geo.to_string(), "52.500000,13.400000");
    }

    #[test]
    fn test_address_text_tracks_every_field() {
        let address = berlin();
        assert_eq!(
            address.to_string(),
            "Invalidenstraße 117, , 10115 Berlin, , DE"
        );
        assert_ne!(address.to_string(), address.clone().with_floor("2").to_string());
    }
}
