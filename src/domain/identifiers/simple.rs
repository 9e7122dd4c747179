//! Simple text identifiers: one kind marker per protocol identifier

use super::{IdKind, TextId};
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use uuid::Uuid;

/// Charging session identifier, GUID-shaped
pub type SessionId = TextId<SessionIdKind>;

pub struct SessionIdKind;

impl IdKind for SessionIdKind {
    const NAME: &'static str = "Session_Id";

    fn grammar() -> Option<&'static Regex> {
        grammar!(r"^[A-Za-z0-9]{8}(-[A-Za-z0-9]{4}){3}-[A-Za-z0-9]{12}$")
    }
}

impl SessionId {
    pub fn new_random() -> Self {
        Self::from_canonical(Uuid::new_v4().to_string())
    }
}

/// RFID card UID: 4, 7 or 10 bytes as upper-case hex
pub type Uid = TextId<UidKind>;

pub struct UidKind;

impl IdKind for UidKind {
    const NAME: &'static str = "UID";

    fn grammar() -> Option<&'static Regex> {
        grammar!(r"^[A-F0-9]{8}$|^[A-F0-9]{14}$|^[A-F0-9]{20}$")
    }
}

/// PIN attached to an RFID identification
///
/// Unlike every other text identifier, PINs compare ordinally.
pub type Pin = TextId<PinKind>;

pub struct PinKind;

impl IdKind for PinKind {
    const NAME: &'static str = "PIN";
    const CASE_SENSITIVE: bool = true;

    fn grammar() -> Option<&'static Regex> {
        grammar!(r"^[a-fA-F0-9]{1,20}$")
    }
}

/// Hashed PIN or other opaque hash text
pub type HashValue = TextId<HashValueKind>;

pub struct HashValueKind;

impl IdKind for HashValueKind {
    const NAME: &'static str = "Hash_Value";
    const MAX_LENGTH: Option<usize> = Some(100);
}

/// Identifier of one protocol exchange
pub type ProcessId = TextId<ProcessIdKind>;

pub struct ProcessIdKind;

impl IdKind for ProcessIdKind {
    const NAME: &'static str = "Process_Id";
}

impl ProcessId {
    pub fn new_random() -> Self {
        Self::from_canonical(Uuid::new_v4().to_string())
    }
}

pub type TimeZone = TextId<TimeZoneKind>;

pub struct TimeZoneKind;

impl IdKind for TimeZoneKind {
    const NAME: &'static str = "Time_Zone";

    fn grammar() -> Option<&'static Regex> {
        grammar!(r"^UTC[+-][0-9]{2}:[0-9]{2}$")
    }
}

pub type PhoneNumber = TextId<PhoneNumberKind>;

pub struct PhoneNumberKind;

impl IdKind for PhoneNumberKind {
    const NAME: &'static str = "Phone_Number";

    fn grammar() -> Option<&'static Regex> {
        grammar!(r"^\+[0-9]{5,15}$")
    }
}

/// ISO 4217 currency code
pub type CurrencyId = TextId<CurrencyIdKind>;

pub struct CurrencyIdKind;

impl IdKind for CurrencyIdKind {
    const NAME: &'static str = "Currency_Id";

    fn grammar() -> Option<&'static Regex> {
        grammar!(r"^[A-Za-z]{3}$")
    }
}

pub type LanguageCode = TextId<LanguageCodeKind>;

pub struct LanguageCodeKind;

impl IdKind for LanguageCodeKind {
    const NAME: &'static str = "Language_Code";

    fn grammar() -> Option<&'static Regex> {
        grammar!(r"^[a-z]{2,3}(?:_[A-Z]{2})?$")
    }
}

/// Session identifier assigned by the CPO or EMP backend
pub type PartnerSessionId = TextId<PartnerSessionIdKind>;

pub struct PartnerSessionIdKind;

impl IdKind for PartnerSessionIdKind {
    const NAME: &'static str = "PartnerSession_Id";
    const MAX_LENGTH: Option<usize> = Some(250);
}

impl PartnerSessionId {
    /// Random alphanumeric partner session id, `length` clamped into 1..=250
    pub fn random(length: usize) -> Self {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(length.clamp(1, 250))
            .map(char::from)
            .collect();
        Self::from_canonical(value)
    }
}

/// Free-text reference of an additional pricing component
pub type AdditionalReference = TextId<AdditionalReferenceKind>;

pub struct AdditionalReferenceKind;

impl IdKind for AdditionalReferenceKind {
    const NAME: &'static str = "Additional_Reference";
    const MAX_LENGTH: Option<usize> = Some(100);
}
