//! Identifiers with a finite, pre-registered vocabulary

use super::{IdKind, TextId};

/// Charging product offered at an EVSE
///
/// The presets are registered, but any other non-empty product code is also legal.
pub type PartnerProductId = TextId<PartnerProductIdKind>;

pub struct PartnerProductIdKind;

impl IdKind for PartnerProductIdKind {
    const NAME: &'static str = "PartnerProduct_Id";
    const MAX_LENGTH: Option<usize> = Some(100);

    fn presets() -> &'static [&'static str] {
        &["AC1", "AC3", "DC", "HPC"]
    }
}

impl PartnerProductId {
    pub fn ac1() -> Self {
        Self::from_canonical("AC1")
    }

    pub fn ac3() -> Self {
        Self::from_canonical("AC3")
    }

    pub fn dc() -> Self {
        Self::from_canonical("DC")
    }

    pub fn hpc() -> Self {
        Self::from_canonical("HPC")
    }
}

/// Unit a price component refers to
pub type ReferenceUnit = TextId<ReferenceUnitKind>;

pub struct ReferenceUnitKind;

impl IdKind for ReferenceUnitKind {
    const NAME: &'static str = "Reference_Unit";
    const CLOSED_VOCABULARY: bool = true;

    fn presets() -> &'static [&'static str] {
        &["HOUR", "DAY", "MINUTE", "KILOWATT_HOUR"]
    }
}

impl ReferenceUnit {
    pub fn hour() -> Self {
        Self::from_canonical("HOUR")
    }

    pub fn day() -> Self {
        Self::from_canonical("DAY")
    }

    pub fn minute() -> Self {
        Self::from_canonical("MINUTE")
    }

    pub fn kilowatt_hour() -> Self {
        Self::from_canonical("KILOWATT_HOUR")
    }
}

/// Day selector for opening times and tariffs
pub type WeekDay = TextId<WeekDayKind>;

pub struct WeekDayKind;

impl IdKind for WeekDayKind {
    const NAME: &'static str = "Week_Day";
    const CLOSED_VOCABULARY: bool = true;

    fn presets() -> &'static [&'static str] {
        &[
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
            "Workdays",
            "Weekend",
            "Everyday",
        ]
    }
}

impl WeekDay {
    pub fn monday() -> Self {
        Self::from_canonical("Monday")
    }

    pub fn tuesday() -> Self {
        Self::from_canonical("Tuesday")
    }

    pub fn wednesday() -> Self {
        Self::from_canonical("Wednesday")
    }

    pub fn thursday() -> Self {
        Self::from_canonical("Thursday")
    }

    pub fn friday() -> Self {
        Self::from_canonical("Friday")
    }

    pub fn saturday() -> Self {
        Self::from_canonical("Saturday")
    }

    pub fn sunday() -> Self {
        Self::from_canonical("Sunday")
    }

    pub fn workdays() -> Self {
        Self::from_canonical("Workdays")
    }

    pub fn weekend() -> Self {
        Self::from_canonical("Weekend")
    }

    pub fn everyday() -> Self {
        Self::from_canonical("Everyday")
    }
}

/// Position of a signed meter value within a charging session
pub type MeteringStatusType = TextId<MeteringStatusTypeKind>;

pub struct MeteringStatusTypeKind;

impl IdKind for MeteringStatusTypeKind {
    const NAME: &'static str = "Metering_Status_Type";
    const CLOSED_VOCABULARY: bool = true;

    fn presets() -> &'static [&'static str] {
        &["Start", "Progress", "End"]
    }
}

impl MeteringStatusType {
    pub fn start() -> Self {
        Self::from_canonical("Start")
    }

    pub fn progress() -> Self {
        Self::from_canonical("Progress")
    }

    pub fn end() -> Self {
        Self::from_canonical("End")
    }
}
