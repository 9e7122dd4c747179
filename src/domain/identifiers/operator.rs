//! Charge point operator identifiers

use super::{cmp_ignore_ascii_case, IdentifierError};
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

const NAME: &str = "Operator_Id";

static GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<country>[A-Za-z]{2})(?P<separator>[\*\-]?)(?P<suffix>[A-Za-z0-9]{3})|\+?(?P<telephone>[0-9]{1,3})\*(?P<din_suffix>[0-9]{3}))$",
    )
    .expect("operator id grammar must compile")
});

/// Wire layouts of an operator id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorIdFormat {
    /// `DEABC`
    Iso,
    /// `DE-ABC`
    IsoHyphen,
    /// `DE*ABC`
    IsoStar,
    /// `+49*822`, numeric suffixes only
    Din,
}

/// Charge point operator id: country plus a three character suffix
///
/// Equality and ordering ignore the wire format and the suffix case.
#[derive(Debug, Clone)]
pub struct OperatorId {
    country: Country,
    suffix: String,
    format: OperatorIdFormat,
}

impl OperatorId {
    pub fn new(
        country: Country,
        suffix: &str,
        format: OperatorIdFormat,
    ) -> Result<Self, IdentifierError> {
        if suffix.len() != 3 || !suffix.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(IdentifierError::invalid(NAME, suffix));
        }
        Ok(Self {
            country,
            suffix: suffix.to_string(),
            format,
        })
    }

    pub fn parse(text: &str) -> Result<Self, IdentifierError> {
        let captures = GRAMMAR
            .captures(text)
            .ok_or_else(|| IdentifierError::invalid(NAME, text))?;

        if let (Some(country), Some(suffix)) = (captures.name("country"), captures.name("suffix"))
        {
            let format = match captures.name("separator").map(|m| m.as_str()) {
                Some("*") => OperatorIdFormat::IsoStar,
                Some("-") => OperatorIdFormat::IsoHyphen,
                _ => OperatorIdFormat::Iso,
            };
            let country = Country::from_alpha2(country.as_str())
                .ok_or_else(|| IdentifierError::invalid(NAME, text))?;
            return Self::new(country, suffix.as_str(), format);
        }

        match (captures.name("telephone"), captures.name("din_suffix")) {
            (Some(telephone), Some(suffix)) => {
                let country = resolve_telephone_code(telephone.as_str())?;
                Self::new(country, suffix.as_str(), OperatorIdFormat::Din)
            }
            _ => Err(IdentifierError::invalid(NAME, text)),
        }
    }

    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    pub fn country(&self) -> Country {
        self.country
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn format(&self) -> OperatorIdFormat {
        self.format
    }

    /// Same operator, different serialisation
    pub fn change_format(&self, format: OperatorIdFormat) -> Self {
        Self {
            format,
            ..self.clone()
        }
    }

    /// Render in `format`; DIN falls back to ISO-star when the country has no
    /// DIN telephone code or the suffix is not numeric
    pub fn to_string_with(&self, format: OperatorIdFormat) -> String {
        let country = self.country.alpha2();
        match (format, self.din_telephone_code()) {
            (OperatorIdFormat::Iso, _) => format!("{country}{}", self.suffix),
            (OperatorIdFormat::IsoHyphen, _) => format!("{country}-{}", self.suffix),
            (OperatorIdFormat::Din, Some(code)) => format!("+{code}*{}", self.suffix),
            (OperatorIdFormat::IsoStar | OperatorIdFormat::Din, _) => {
                format!("{country}*{}", self.suffix)
            }
        }
    }

    /// Telephone code when this operator can be written in DIN layout
    pub(super) fn din_telephone_code(&self) -> Option<u16> {
        self.country
            .din_telephone_code()
            .filter(|_| self.suffix.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Length of the recorded serialisation
    pub fn len(&self) -> usize {
        self.to_string().len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffix.is_empty()
    }

    /// Recorded serialisation with `*` escaped for URL paths
    pub fn url_encoded(&self) -> String {
        urlencoding::encode(&self.to_string()).into_owned()
    }
}

pub(super) fn resolve_telephone_code(token: &str) -> Result<Country, IdentifierError> {
    token
        .parse::<u16>()
        .ok()
        .and_then(Country::from_telephone_code)
        .ok_or_else(|| IdentifierError::UnknownCountry {
            token: format!("+{token}"),
        })
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(self.format))
    }
}

impl PartialEq for OperatorId {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OperatorId {}

impl Ord for OperatorId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.country
            .cmp(&other.country)
            .then_with(|| cmp_ignore_ascii_case(&self.suffix, &other.suffix))
    }
}

impl PartialOrd for OperatorId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for OperatorId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.country.hash(state);
        self.suffix.to_ascii_uppercase().hash(state);
    }
}

impl FromStr for OperatorId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for OperatorId {
    type Error = IdentifierError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Serialize for OperatorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for OperatorId {
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
    #[case("DEABC", OperatorIdFormat::Iso)]
    #[case("DE-ABC", OperatorIdFormat::IsoHyphen)]
    #[case("DE*ABC", OperatorIdFormat::IsoStar)]
    #[case("+49*822", OperatorIdFormat::Din)]
    #[case("49*822", OperatorIdFormat::Din)]
    fn parse_records_the_matched_variant(#[case] text: &str, #[case] format: OperatorIdFormat) {
        let id = OperatorId::parse(text).unwrap();
        assert_eq!(id.format(), format);
        assert_eq!(id.country().alpha2(), "DE");
    }

    #[test]
    fn all_variants_of_one_operator_are_equal() {
        let star = OperatorId::parse("DE*ABC").unwrap();
        assert_eq!(star, OperatorId::parse("DEABC").unwrap());
        assert_eq!(star, OperatorId::parse("DE-ABC").unwrap());
        assert_eq!(star, OperatorId::parse("de*abc").unwrap());

        let numeric = OperatorId::parse("DE*822").unwrap();
        assert_eq!(numeric, OperatorId::parse("+49*822").unwrap());
        assert_eq!(numeric, OperatorId::parse("DE822").unwrap());
    }

    #[test]
    fn to_string_emits_recorded_or_requested_variant() {
        let id = OperatorId::parse("DE-ABC").unwrap();
        assert_eq!(id.to_string(), "DE-ABC");
        assert_eq!(id.to_string_with(OperatorIdFormat::Iso), "DEABC");
        assert_eq!(id.to_string_with(OperatorIdFormat::IsoStar), "DE*ABC");
        assert_eq!(id.to_string_with(OperatorIdFormat::Din), "DE*ABC");
        assert_eq!(id.len(), 6);

        let numeric = OperatorId::parse("DE-822").unwrap();
        assert_eq!(numeric.to_string_with(OperatorIdFormat::Din), "+49*822");
    }

    #[test]
    fn change_format_keeps_identity() {
        let id = OperatorId::parse("DE*822").unwrap();
        let din = id.change_format(OperatorIdFormat::Din);
        assert_eq!(din, id);
        assert_eq!(din.to_string(), "+49*822");
    }

    #[test]
    fn unknown_alpha2_countries_are_accepted() {
        let id = OperatorId::parse("QX*ABC").unwrap();
        assert!(!id.country().is_registered());
        assert_eq!(id.to_string_with(OperatorIdFormat::Din), "QX*ABC");
    }

    #[test]
    fn unknown_telephone_codes_fail_the_parse() {
        assert!(matches!(
            OperatorId::parse("+999*822"),
            Err(IdentifierError::UnknownCountry { .. })
        ));
    }

    #[rstest]
    #[case("")]
    #[case("DE*AB")]
    #[case("DE**ABC")]
    #[case("D*ABC")]
    #[case("DE*ABCD")]
    #[case("+1234*822")]
    #[case("+49*ABC")]
    #[case("+49*82A")]
    #[case(" DE*ABC")]
    #[case("DE*ABC ")]
    fn malformed_operator_ids_are_rejected(#[case] text: &str) {
        assert!(OperatorId::parse(text).is_err());
    }

    #[rstest]
    #[case("US*ABC", "US*ABC")]
    #[case("US*822", "US*822")]
    #[case("CA*822", "+1*822")]
    #[case("DE*ABC", "DE*ABC")]
    fn din_rendering_round_trips_to_the_same_operator(#[case] text: &str, #[case] din: &str) {
        let id = OperatorId::parse(text).unwrap();
        let rendered = id.to_string_with(OperatorIdFormat::Din);
        assert_eq!(rendered, din);

        let back = OperatorId::parse(&rendered).unwrap();
        assert_eq!(back, id);
        assert_eq!(back.country().alpha2(), id.country().alpha2());
    }

    #[test]
    fn url_encoding_escapes_the_star() {
        assert_eq!(OperatorId::parse("DE*ABC").unwrap().url_encoded(), "DE%2AABC");
    }
}
