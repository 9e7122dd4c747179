//! Small validated value types
//!
//! Newtypes for the scalar values that travel with OICP messages, so that
//! validation happens once at the boundary instead of at every use.

use nutype::nutype;
use rust_decimal::Decimal;

/// Name of a request field, reported by argument validation errors
///
/// Limited to 100 characters; field names are short identifiers.
#[nutype(
    validate(not_empty, len_char_max = 100),
    derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsRef, Display)
)]
pub struct FieldName(String);

impl FieldName {
    pub const UNKNOWN: &'static str = "unknown_field";

    pub fn unknown() -> Self {
        Self::try_new(Self::UNKNOWN).expect("placeholder field name is valid")
    }
}

/// Human readable operator name sent along with push requests
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 200),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct OperatorName(String);

/// Energy delivered during a charging session, in kWh
#[nutype(
    validate(predicate = |kwh: &Decimal| !kwh.is_sign_negative()),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct ConsumedEnergy(Decimal);

/// HTTP status code reported by the transport
#[nutype(
    validate(predicate = |code: &u16| (100..=599).contains(code)),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct HttpStatusCode(u16);

impl HttpStatusCode {
    pub fn ok() -> Self {
        Self::try_new(200).expect("200 is a valid status code")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(self.as_ref())
    }
}

/// Number of hash characters used when deriving pool and station ids
///
/// Always within 12..=50; out of range values are clamped, never rejected.
#[nutype(
    sanitize(with = |length: usize| length.clamp(12, 50)),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display,
        Default
    ),
    default = 20
)]
pub struct DerivedIdLength(usize);
