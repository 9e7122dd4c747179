//! Country references used by operator, provider and EVSE identifiers
//!
//! OICP identifiers name their country either by ISO 3166-1 alpha-2 code
//! (`DE*ABC`) or, in the DIN layout, by telephone country code (`+49*822`).
//! Alpha-2 codes that are well formed but missing from the registry resolve to a
//! synthetic, unnamed country instead of failing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

/// (alpha-2, telephone code, name)
const REGISTRY: &[(&str, u16, &str)] = &[
    ("AT", 43, "Austria"),
    ("AU", 61, "Australia"),
    ("BE", 32, "Belgium"),
    ("BG", 359, "Bulgaria"),
    ("CA", 1, "Canada"),
    ("CH", 41, "Switzerland"),
    ("CN", 86, "China"),
    ("CY", 357, "Cyprus"),
    ("CZ", 420, "Czech Republic"),
    ("DE", 49, "Germany"),
    ("DK", 45, "Denmark"),
    ("EE", 372, "Estonia"),
    ("ES", 34, "Spain"),
    ("FI", 358, "Finland"),
    ("FR", 33, "France"),
    ("GB", 44, "United Kingdom"),
    ("GR", 30, "Greece"),
    ("HR", 385, "Croatia"),
    ("HU", 36, "Hungary"),
    ("IE", 353, "Ireland"),
    ("IL", 972, "Israel"),
    ("IN", 91, "India"),
    ("IS", 354, "Iceland"),
    ("IT", 39, "Italy"),
    ("JP", 81, "Japan"),
    ("KR", 82, "South Korea"),
    ("LI", 423, "Liechtenstein"),
    ("LT", 370, "Lithuania"),
    ("LU", 352, "Luxembourg"),
    ("LV", 371, "Latvia"),
    ("MC", 377, "Monaco"),
    ("MT", 356, "Malta"),
    ("NL", 31, "Netherlands"),
    ("NO", 47, "Norway"),
    ("NZ", 64, "New Zealand"),
    ("PL", 48, "Poland"),
    ("PT", 351, "Portugal"),
    ("RO", 40, "Romania"),
    ("RS", 381, "Serbia"),
    ("SE", 46, "Sweden"),
    ("SI", 386, "Slovenia"),
    ("SK", 421, "Slovakia"),
    ("TR", 90, "Turkey"),
    ("UA", 380, "Ukraine"),
    ("US", 1, "United States"),
    ("ZA", 27, "South Africa"),
];

/// Country reference; identity is the upper-case alpha-2 code
#[derive(Debug, Clone, Copy)]
pub struct Country {
    alpha2: [u8; 2],
    telephone_code: Option<u16>,
    name: Option<&'static str>,
}

impl Country {
    /// Resolve a two-letter code; unregistered but well-formed codes yield a
    /// synthetic, unnamed country without a telephone code
    pub fn from_alpha2(code: &str) -> Option<Self> {
        let bytes = code.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return None;
        }
        let alpha2 = [bytes[0].to_ascii_uppercase(), bytes[1].to_ascii_uppercase()];

        Some(
            REGISTRY
                .iter()
                .find(|(code, _, _)| code.as_bytes() == alpha2.as_slice())
                .map(|&(_, telephone_code, name)| Self {
                    alpha2,
                    telephone_code: Some(telephone_code),
                    name: Some(name),
                })
                .unwrap_or(Self {
                    alpha2,
                    telephone_code: None,
                    name: None,
                }),
        )
    }

    /// Every registered country, in registry order
    pub fn registered() -> impl Iterator<Item = Self> {
        REGISTRY
            .iter()
            .filter_map(|(alpha2, _, _)| Self::from_alpha2(alpha2))
    }

    /// First registered country with this telephone code
    pub fn from_telephone_code(code: u16) -> Option<Self> {
        REGISTRY
            .iter()
            .find(|(_, telephone_code, _)| *telephone_code == code)
            .and_then(|(alpha2, _, _)| Self::from_alpha2(alpha2))
    }

    pub fn alpha2(&self) -> &str {
        std::str::from_utf8(&self.alpha2).unwrap_or_default()
    }

    pub fn telephone_code(&self) -> Option<u16> {
        self.telephone_code
    }

    /// Telephone code usable in DIN layouts
    ///
    /// `None` unless the code resolves back to this country, so countries that
    /// share a code with an earlier registration (US behind CA on `+1`) keep
    /// their identity by rendering in an alpha-2 layout instead.
    pub fn din_telephone_code(&self) -> Option<u16> {
        self.telephone_code
            .filter(|&code| Self::from_telephone_code(code).is_some_and(|country| country == *self))
    }

    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// Whether the code was found in the registry
    pub fn is_registered(&self) -> bool {
        self.name.is_some()
    }
}

impl PartialEq for Country {
    fn eq(&self, other: &Self) -> bool {
        self.alpha2 == other.alpha2
    }
}

impl Eq for Country {}

impl Ord for Country {
    fn cmp(&self, other: &Self) -> Ordering {
        self.alpha2.cmp(&other.alpha2)
    }
}

impl PartialOrd for Country {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Country {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alpha2.hash(state);
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alpha2())
    }
}

impl Serialize for Country {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.alpha2())
    }
}

impl<'de> Deserialize<'de> for Country {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::from_alpha2(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid country code '{code}'")))
    }
}
