//! Charging pool and station identifiers, including hash-based derivation
//!
//! Re-registering the same physical asset must yield the same id, so derived
//! ids are a pure function of the asset's semantic attributes: the attributes
//! are concatenated in a fixed order, hashed with SHA-256 and the leading hex
//! characters become the id suffix.

use super::{IdKind, IdentifierError, OperatorId, OperatorIdFormat, TextId};
use crate::domain::{
    location::{Address, GeoCoordinate},
    types::DerivedIdLength,
};
use sha2::{Digest, Sha256};

pub type ChargingPoolId = TextId<ChargingPoolIdKind>;

pub struct ChargingPoolIdKind;

impl IdKind for ChargingPoolIdKind {
    const NAME: &'static str = "ChargingPool_Id";
    const MAX_LENGTH: Option<usize> = Some(100);
}

pub type ChargingStationId = TextId<ChargingStationIdKind>;

pub struct ChargingStationIdKind;

impl IdKind for ChargingStationIdKind {
    const NAME: &'static str = "ChargingStation_Id";
    const MAX_LENGTH: Option<usize> = Some(100);
}

/// Semantic attributes an id is derived from
#[derive(Debug, Clone, Copy)]
pub struct DerivationInput<'a> {
    pub operator_id: &'a OperatorId,
    pub address: &'a Address,
    pub geo_location: Option<&'a GeoCoordinate>,
    pub sub_operator_name: Option<&'a str>,
    pub extra: Option<&'a str>,
}

impl<'a> DerivationInput<'a> {
    pub fn new(operator_id: &'a OperatorId, address: &'a Address) -> Self {
        Self {
            operator_id,
            address,
            geo_location: None,
            sub_operator_name: None,
            extra: None,
        }
    }

    pub fn with_geo_location(mut self, geo_location: &'a GeoCoordinate) -> Self {
        self.geo_location = Some(geo_location);
        self
    }

    pub fn with_sub_operator_name(mut self, sub_operator_name: &'a str) -> Self {
        self.sub_operator_name = Some(sub_operator_name);
        self
    }

    pub fn with_extra(mut self, extra: &'a str) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Upper-case hex suffix of `length` characters, optionally remapped
    pub fn suffix(&self, length: DerivedIdLength, mapper: Option<&dyn Fn(String) -> String>) -> String {
        let geo_location = self
            .geo_location
            .map(ToString::to_string)
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(
            self.operator_id
                .to_string_with(OperatorIdFormat::IsoStar)
                .as_bytes(),
        );
        hasher.update(self.address.to_string().as_bytes());
        hasher.update(geo_location.as_bytes());
        hasher.update(self.sub_operator_name.unwrap_or_default().as_bytes());
        hasher.update(self.extra.unwrap_or_default().as_bytes());

        let mut suffix = hex::encode(hasher.finalize());
        suffix.truncate(length.into_inner());
        suffix.make_ascii_uppercase();

        match mapper {
            Some(mapper) => mapper(suffix),
            None => suffix,
        }
    }

    fn derive(
        &self,
        marker: char,
        length: DerivedIdLength,
        mapper: Option<&dyn Fn(String) -> String>,
    ) -> String {
        format!(
            "{}*{marker}{}",
            self.operator_id.to_string_with(OperatorIdFormat::IsoStar),
            self.suffix(length, mapper)
        )
    }
}

impl ChargingPoolId {
    /// Deterministic pool id `<operator>*P<hash>`
    pub fn generate(
        input: &DerivationInput<'_>,
        length: DerivedIdLength,
        mapper: Option<&dyn Fn(String) -> String>,
    ) -> Result<Self, IdentifierError> {
        Self::parse(&input.derive('P', length, mapper))
    }
}

impl ChargingStationId {
    /// Deterministic station id `<operator>*S<hash>`
    pub fn generate(
        input: &DerivationInput<'_>,
        length: DerivedIdLength,
        mapper: Option<&dyn Fn(String) -> String>,
    ) -> Result<Self, IdentifierError> {
        Self::parse(&input.derive('S', length, mapper))
    }
}
