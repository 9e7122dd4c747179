//! EVSE data records and the charging infrastructure they belong to
//!
//! The push orchestrator works on EVSE-level records only. The groupings in
//! this module (station, pool, operator, roaming network) exist so callers can
//! hand over whatever level they hold; each one flattens to its EVSEs.

use crate::domain::{
    identifiers::{
        ChargingPoolId, ChargingStationId, EvseId, LanguageCode, OperatorId, PhoneNumber, WeekDay,
    },
    location::{Address, GeoCoordinate},
    status::{EvseStatusRecord, EvseStatusType},
    types::OperatorName,
};
use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlugType {
    #[serde(rename = "Type 2 Outlet")]
    Type2Outlet,
    #[serde(rename = "Type 2 Connector (Cable Attached)")]
    Type2Connector,
    #[serde(rename = "CCS Combo 2 Plug (Cable Attached)")]
    CcsCombo2,
    #[serde(rename = "CHAdeMO")]
    Chademo,
    #[serde(rename = "Type F Schuko")]
    TypeFSchuko,
    #[serde(rename = "Tesla Connector")]
    TeslaConnector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthenticationMode {
    #[serde(rename = "NFC RFID Classic")]
    NfcRfidClassic,
    #[serde(rename = "NFC RFID DESFire")]
    NfcRfidDesfire,
    #[serde(rename = "PnC")]
    PlugAndCharge,
    #[serde(rename = "REMOTE")]
    Remote,
    #[serde(rename = "Direct Payment")]
    DirectPayment,
}

/// Opening hours for one day or day group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OpeningTime {
    pub period: WeekDay,
    pub begin: NaiveTime,
    pub end: NaiveTime,
}

/// Static EVSE data as uploaded to the hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EvseDataRecord {
    #[serde(rename = "EvseID")]
    pub evse_id: EvseId,
    #[serde(rename = "ChargingStationID", skip_serializing_if = "Option::is_none")]
    pub charging_station_id: Option<ChargingStationId>,
    #[serde(rename = "ChargingPoolID", skip_serializing_if = "Option::is_none")]
    pub charging_pool_id: Option<ChargingPoolId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charging_station_name: Option<String>,
    pub address: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_coordinates: Option<GeoCoordinate>,
    #[serde(default)]
    pub plugs: Vec<PlugType>,
    #[serde(default)]
    pub authentication_modes: Vec<AuthenticationMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity_kw: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotline_phone_number: Option<PhoneNumber>,
    pub is_open_24_hours: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opening_times: Vec<OpeningTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_language: Option<LanguageCode>,
    pub renewable_energy: bool,
}

impl EvseDataRecord {
    pub fn new(evse_id: EvseId, address: Address) -> Self {
        Self {
            evse_id,
            charging_station_id: None,
            charging_pool_id: None,
            charging_station_name: None,
            address,
            geo_coordinates: None,
            plugs: Vec::new(),
            authentication_modes: Vec::new(),
            max_capacity_kw: None,
            hotline_phone_number: None,
            is_open_24_hours: true,
            opening_times: Vec::new(),
            default_language: None,
            renewable_energy: false,
        }
    }

    pub fn operator_id(&self) -> &OperatorId {
        self.evse_id.operator_id()
    }

    pub fn with_charging_station_id(mut self, id: ChargingStationId) -> Self {
        self.charging_station_id = Some(id);
        self
    }

    pub fn with_charging_pool_id(mut self, id: ChargingPoolId) -> Self {
        self.charging_pool_id = Some(id);
        self
    }

    pub fn with_charging_station_name(mut self, name: impl Into<String>) -> Self {
        self.charging_station_name = Some(name.into());
        self
    }

    pub fn with_geo_coordinates(mut self, geo: GeoCoordinate) -> Self {
        self.geo_coordinates = Some(geo);
        self
    }

    pub fn with_plug(mut self, plug: PlugType) -> Self {
        self.plugs.push(plug);
        self
    }

    pub fn with_authentication_mode(mut self, mode: AuthenticationMode) -> Self {
        self.authentication_modes.push(mode);
        self
    }

    pub fn with_max_capacity_kw(mut self, kw: Decimal) -> Self {
        self.max_capacity_kw = Some(kw);
        self
    }

    pub fn with_hotline_phone_number(mut self, phone: PhoneNumber) -> Self {
        self.hotline_phone_number = Some(phone);
        self
    }

    /// Restricted opening hours; clears the 24/7 flag
    pub fn with_opening_time(mut self, opening_time: OpeningTime) -> Self {
        self.is_open_24_hours = false;
        self.opening_times.push(opening_time);
        self
    }

    pub fn with_default_language(mut self, language: LanguageCode) -> Self {
        self.default_language = Some(language);
        self
    }

    pub fn with_renewable_energy(mut self, renewable_energy: bool) -> Self {
        self.renewable_energy = renewable_energy;
        self
    }
}

/// A single EVSE with its data and current status
#[derive(Debug, Clone, PartialEq)]
pub struct Evse {
    pub data: EvseDataRecord,
    pub status: EvseStatusType,
}

impl Evse {
    pub fn new(data: EvseDataRecord, status: EvseStatusType) -> Self {
        Self { data, status }
    }

    pub fn id(&self) -> &EvseId {
        &self.data.evse_id
    }

    pub fn status_record(&self) -> EvseStatusRecord {
        EvseStatusRecord::new(self.data.evse_id.clone(), self.status)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargingStation {
    pub id: ChargingStationId,
    pub name: Option<String>,
    pub evses: Vec<Evse>,
}

impl ChargingStation {
    pub fn new(id: ChargingStationId) -> Self {
        Self {
            id,
            name: None,
            evses: Vec::new(),
        }
    }

    pub fn with_evse(mut self, evse: Evse) -> Self {
        self.evses.push(evse);
        self
    }

    pub fn evses(&self) -> impl Iterator<Item = &Evse> + '_ {
        self.evses.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargingPool {
    pub id: ChargingPoolId,
    pub name: Option<String>,
    pub stations: Vec<ChargingStation>,
}

impl ChargingPool {
    pub fn new(id: ChargingPoolId) -> Self {
        Self {
            id,
            name: None,
            stations: Vec::new(),
        }
    }

    pub fn with_station(mut self, station: ChargingStation) -> Self {
        self.stations.push(station);
        self
    }

    pub fn evses(&self) -> impl Iterator<Item = &Evse> + '_ {
        self.stations.iter().flat_map(|station| station.evses())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargingStationOperator {
    pub id: OperatorId,
    pub name: Option<OperatorName>,
    pub pools: Vec<ChargingPool>,
}

impl ChargingStationOperator {
    pub fn new(id: OperatorId) -> Self {
        Self {
            id,
            name: None,
            pools: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: OperatorName) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_pool(mut self, pool: ChargingPool) -> Self {
        self.pools.push(pool);
        self
    }

    pub fn evses(&self) -> impl Iterator<Item = &Evse> + '_ {
        self.pools.iter().flat_map(|pool| pool.evses())
    }
}

/// Every operator reachable through one hub connection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoamingNetwork {
    pub operators: Vec<ChargingStationOperator>,
}

impl RoamingNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operator(mut self, operator: ChargingStationOperator) -> Self {
        self.operators.push(operator);
        self
    }

    pub fn evses(&self) -> impl Iterator<Item = &Evse> + '_ {
        self.operators.iter().flat_map(|operator| operator.evses())
    }
}
