//! e-Mobility provider identifiers

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

const NAME: &str = "Provider_Id";

static GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<country>[A-Za-z]{2})(?P<separator>[\*\-]?)(?P<suffix>[A-Za-z0-9]{3})$")
        .expect("provider id grammar must compile")
});

/// Wire layouts of a provider id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderIdFormat {
    /// `DEXYZ`
    Iso,
    /// `DE-XYZ`
    IsoHyphen,
    /// `DE*XYZ`
    IsoStar,
}

/// e-Mobility provider id: country plus a three character suffix
#[derive(Debug, Clone)]
pub struct ProviderId {
    country: Country,
    suffix: String,
    format: ProviderIdFormat,
}

impl ProviderId {
    pub fn new(
        country: Country,
        suffix: &str,
        format: ProviderIdFormat,
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

        let format = match captures.name("separator").map(|m| m.as_str()) {
            Some("*") => ProviderIdFormat::IsoStar,
            Some("-") => ProviderIdFormat::IsoHyphen,
            _ => ProviderIdFormat::Iso,
        };

        match (captures.name("country"), captures.name("suffix")) {
            (Some(country), Some(suffix)) => {
                let country = Country::from_alpha2(country.as_str())
                    .ok_or_else(|| IdentifierError::invalid(NAME, text))?;
                Self::new(country, suffix.as_str(), format)
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

    pub fn format(&self) -> ProviderIdFormat {
        self.format
    }

    pub fn change_format(&self, format: ProviderIdFormat) -> Self {
        Self {
            format,
            ..self.clone()
        }
    }

    pub fn to_string_with(&self, format: ProviderIdFormat) -> String {
        let country = self.country.alpha2();
        match format {
            ProviderIdFormat::Iso => format!("{country}{}", self.suffix),
            ProviderIdFormat::IsoHyphen => format!("{country}-{}", self.suffix),
            ProviderIdFormat::IsoStar => format!("{country}*{}", self.suffix),
        }
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

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(self.format))
    }
}

impl PartialEq for ProviderId {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ProviderId {}

impl Ord for ProviderId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.country
            .cmp(&other.country)
            .then_with(|| cmp_ignore_ascii_case(&self.suffix, &other.suffix))
    }
}

impl PartialOrd for ProviderId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for ProviderId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.country.hash(state);
        self.suffix.to_ascii_uppercase().hash(state);
    }
}

impl FromStr for ProviderId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = IdentifierError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Serialize for ProviderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ProviderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
