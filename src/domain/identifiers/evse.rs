//! EVSE identifiers

use super::{
    cmp_ignore_ascii_case, operator::resolve_telephone_code, IdentifierError, OperatorId,
    OperatorIdFormat,
};
use crate::domain::country::Country;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
    sync::LazyLock,
};

const NAME: &str = "EVSE_Id";
const ISO_SUFFIX_MAX: usize = 30;
const DIN_SUFFIX_MAX: usize = 32;

static GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<country>[A-Za-z]{2})(?P<first>\*?)(?P<operator>[A-Za-z0-9]{3})(?P<second>\*?)E(?P<suffix>[A-Za-z0-9\*]{1,30})|\+?(?P<telephone>[0-9]{1,3})\*(?P<din_operator>[0-9]{3})\*(?P<din_suffix>[0-9\*]{1,32}))$",
    )
    .expect("EVSE id grammar must compile")
});

/// Wire layouts of an EVSE id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvseIdFormat {
    /// `DEABCE1234`
    Iso,
    /// `DE*ABC*E1234`
    IsoStar,
    /// Legacy `+49*822*1234`, numeric operator and suffix only
    Din,
}

impl EvseIdFormat {
    fn operator_format(self) -> OperatorIdFormat {
        match self {
            Self::Iso => OperatorIdFormat::Iso,
            Self::IsoStar => OperatorIdFormat::IsoStar,
            Self::Din => OperatorIdFormat::Din,
        }
    }
}

/// EVSE id: the owning operator plus a per-operator suffix
#[derive(Debug, Clone)]
pub struct EvseId {
    operator_id: OperatorId,
    suffix: String,
    format: EvseIdFormat,
}

impl EvseId {
    /// Suffixes longer than 30 characters are only accepted when the whole id
    /// can be written in the legacy DIN layout
    pub fn new(
        operator_id: OperatorId,
        suffix: &str,
        format: EvseIdFormat,
    ) -> Result<Self, IdentifierError> {
        if suffix.is_empty()
            || suffix.len() > DIN_SUFFIX_MAX
            || !suffix.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'*')
        {
            return Err(IdentifierError::invalid(NAME, suffix));
        }
        let id = Self {
            operator_id: operator_id.change_format(format.operator_format()),
            suffix: suffix.to_string(),
            format,
        };
        if suffix.len() > ISO_SUFFIX_MAX && id.din_telephone_code().is_none() {
            return Err(IdentifierError::invalid(NAME, suffix));
        }
        Ok(id)
    }

    pub fn parse(text: &str) -> Result<Self, IdentifierError> {
        let captures = GRAMMAR
            .captures(text)
            .ok_or_else(|| IdentifierError::invalid(NAME, text))?;

        if let (Some(country), Some(operator), Some(suffix)) = (
            captures.name("country"),
            captures.name("operator"),
            captures.name("suffix"),
        ) {
            let starred = captures.name("first").is_some_and(|m| !m.is_empty())
                || captures.name("second").is_some_and(|m| !m.is_empty());
            let format = if starred {
                EvseIdFormat::IsoStar
            } else {
                EvseIdFormat::Iso
            };
            let country = Country::from_alpha2(country.as_str())
                .ok_or_else(|| IdentifierError::invalid(NAME, text))?;
            let operator_id =
                OperatorId::new(country, operator.as_str(), format.operator_format())?;
            return Self::new(operator_id, suffix.as_str(), format);
        }

        match (
            captures.name("telephone"),
            captures.name("din_operator"),
            captures.name("din_suffix"),
        ) {
            (Some(telephone), Some(operator), Some(suffix)) => {
                let country = resolve_telephone_code(telephone.as_str())?;
                let operator_id = OperatorId::new(country, operator.as_str(), OperatorIdFormat::Din)?;
                Self::new(operator_id, suffix.as_str(), EvseIdFormat::Din)
            }
            _ => Err(IdentifierError::invalid(NAME, text)),
        }
    }

    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    /// Operator scope of this EVSE, in the matching operator format
    pub fn operator_id(&self) -> &OperatorId {
        &self.operator_id
    }

    pub fn country(&self) -> Country {
        self.operator_id.country()
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn format(&self) -> EvseIdFormat {
        self.format
    }

    pub fn change_format(&self, format: EvseIdFormat) -> Self {
        Self {
            operator_id: self.operator_id.change_format(format.operator_format()),
            suffix: self.suffix.clone(),
            format,
        }
    }

    /// Render in `format`
    ///
    /// DIN falls back to ISO-star when the id has no DIN form. Suffixes too
    /// long for the ISO layouts are always written in DIN.
    pub fn to_string_with(&self, format: EvseIdFormat) -> String {
        let country = self.country();
        let operator = self.operator_id.suffix();
        let din = self.din_telephone_code();
        let format = match din {
            Some(_) if self.suffix.len() > ISO_SUFFIX_MAX => EvseIdFormat::Din,
            _ => format,
        };
        match (format, din) {
            (EvseIdFormat::Iso, _) => format!("{country}{operator}E{}", self.suffix),
            (EvseIdFormat::Din, Some(code)) => format!("+{code}*{operator}*{}", self.suffix),
            (EvseIdFormat::IsoStar | EvseIdFormat::Din, _) => {
                format!("{country}*{operator}*E{}", self.suffix)
            }
        }
    }

    fn din_telephone_code(&self) -> Option<u16> {
        self.operator_id
            .din_telephone_code()
            .filter(|_| self.suffix.bytes().all(|b| b.is_ascii_digit() || b == b'*'))
    }

    pub fn len(&self) -> usize {
        self.to_string().len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffix.is_empty()
    }

    pub fn url_encoded(&self) -> String {
        urlencoding::encode(&self.to_string()).into_owned()
    }
}

impl fmt::Display for EvseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(self.format))
    }
}

impl PartialEq for EvseId {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EvseId {}

impl Ord for EvseId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.operator_id
            .cmp(&other.operator_id)
            .then_with(|| cmp_ignore_ascii_case(&self.suffix, &other.suffix))
    }
}

impl PartialOrd for EvseId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for EvseId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.operator_id.hash(state);
        self.suffix.to_ascii_uppercase().hash(state);
    }
}

impl FromStr for EvseId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for EvseId {
    type Error = IdentifierError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Serialize for EvseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EvseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DE*ABC*E1234", EvseIdFormat::IsoStar, "1234")]
    #[case("DEABCE1234", EvseIdFormat::Iso, "1234")]
    #[case("DE*ABC*E1*2", EvseIdFormat::IsoStar, "1*2")]
    #[case("+49*822*1234", EvseIdFormat::Din, "1234")]
    #[case("49*822*1*2*3", EvseIdFormat::Din, "1*2*3")]
    fn parse_splits_operator_and_suffix(
        #[case] text: &str,
        #[case] format: EvseIdFormat,
        #[case] suffix: &str,
    ) {
        let id = EvseId::parse(text).unwrap();
        assert_eq!(id.format(), format);
        assert_eq!(id.suffix(), suffix);
        assert_eq!(id.country().alpha2(), "DE");
    }

    #[test]
    fn operator_scope_matches_the_operator_id() {
        let evse = EvseId::parse("DE*ABC*E1234").unwrap();
        assert_eq!(evse.operator_id(), &OperatorId::parse("DE*ABC").unwrap());
        assert_eq!(evse.operator_id().to_string(), "DE*ABC");

        let legacy = EvseId::parse("+49*822*1234").unwrap();
        assert_eq!(legacy.operator_id().to_string(), "+49*822");
    }

    #[test]
    fn formats_are_interchangeable() {
        let star = EvseId::parse("DE*ABC*E1234").unwrap();
        assert_eq!(star.to_string_with(EvseIdFormat::Iso), "DEABCE1234");
        assert_eq!(star.to_string_with(EvseIdFormat::Din), "DE*ABC*E1234");
        assert_eq!(star, EvseId::parse("DEABCE1234").unwrap());
        assert_eq!(star, EvseId::parse("de*abc*E1234").unwrap());

        let numeric = EvseId::parse("DE*822*E1234").unwrap();
        assert_eq!(numeric.to_string_with(EvseIdFormat::Din), "+49*822*1234");
        assert_eq!(numeric, EvseId::parse("+49*822*1234").unwrap());
    }

    #[rstest]
    #[case(30, true)]
    #[case(31, false)]
    #[case(32, false)]
    fn legacy_suffix_lengths_round_trip_in_every_format(
        #[case] length: usize,
        #[case] fits_iso: bool,
    ) {
        let id = EvseId::parse(&format!("+49*822*{}", "1".repeat(length))).unwrap();
        for format in [EvseIdFormat::Iso, EvseIdFormat::IsoStar, EvseIdFormat::Din] {
            let rendered = id.to_string_with(format);
            let back = EvseId::parse(&rendered).unwrap();
            assert_eq!(back, id);
            assert_eq!(back.to_string_with(format), rendered);
            assert_eq!(rendered.starts_with('+'), !fits_iso || format == EvseIdFormat::Din);
        }
    }

    #[rstest]
    #[case(30)]
    #[case(31)]
    #[case(32)]
    #[case(33)]
    fn long_suffixes_are_limited_to_din_capable_ids(#[case] length: usize) {
        let suffix = "1".repeat(length);
        for format in [EvseIdFormat::Iso, EvseIdFormat::IsoStar, EvseIdFormat::Din] {
            let alphanumeric = OperatorId::parse("DE*ABC").unwrap();
            let numeric = OperatorId::parse("DE*822").unwrap();
            let shared_code = OperatorId::parse("US*822").unwrap();

            assert_eq!(EvseId::new(alphanumeric, &suffix, format).is_ok(), length <= 30);
            assert_eq!(EvseId::new(numeric, &suffix, format).is_ok(), length <= 32);
            assert_eq!(EvseId::new(shared_code, &suffix, format).is_ok(), length <= 30);
        }
    }

    #[test]
    fn url_encoding_escapes_every_star() {
        assert_eq!(
            EvseId::parse("DE*ABC*E1*2").unwrap().url_encoded(),
            "DE%2AABC%2AE1%2A2"
        );
    }

    #[test]
    fn unknown_alpha2_country_degrades_gracefully() {
        let id = EvseId::parse("QX*ABC*E1").unwrap();
        assert!(!id.country().is_registered());
    }

    #[rstest]
    #[case("DE*ABC*1234")]
    #[case("DE*AB*E1234")]
    #[case("DE*ABC*E")]
    #[case("+49*822")]
    #[case("+999*822*1234")]
    #[case("+49*ABC*1234")]
    #[case("+49*822*12A4")]
    #[case(" DE*ABC*E1234")]
    fn malformed_evse_ids_are_rejected(#[case] text: &str) {
        assert!(EvseId::parse(text).is_err());
    }
}
