//! Typed identifiers for OICP messages
//!
//! Simple identifiers share one implementation, [`TextId`], parametrised by a
//! zero-sized kind marker that carries the grammar, the optional length cap and
//! the comparison rules. Composite identifiers ([`OperatorId`], [`ProviderId`],
//! [`EvseId`]) hold a [`Country`](crate::domain::country::Country) reference and
//! remember the wire format they were parsed from, while comparing only on
//! their semantic parts.

/// Compiles an identifier grammar once and hands out a `'static` reference.
macro_rules! grammar {
    ($pattern:literal) => {{
        static GRAMMAR: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
            regex::Regex::new($pattern).expect("identifier grammar must compile")
        });
        Some(&*GRAMMAR)
    }};
}

mod derived;
mod evse;
mod operator;
mod provider;
mod simple;
mod vocabulary;

pub use derived::{ChargingPoolId, ChargingStationId, DerivationInput};
pub use evse::{EvseId, EvseIdFormat};
pub use operator::{OperatorId, OperatorIdFormat};
pub use provider::{ProviderId, ProviderIdFormat};
pub use simple::{
    AdditionalReference, CurrencyId, HashValue, LanguageCode, PartnerSessionId, PhoneNumber, Pin,
    ProcessId, SessionId, TimeZone, Uid,
};
pub use vocabulary::{MeteringStatusType, PartnerProductId, ReferenceUnit, WeekDay};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    str::FromStr,
};
use thiserror::Error;

/// Failure to turn text into an identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("Invalid {kind} format: '{value}'")]
    InvalidFormat { kind: &'static str, value: String },

    #[error("Unknown country reference '{token}'")]
    UnknownCountry { token: String },
}

impl IdentifierError {
    pub(crate) fn invalid(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidFormat {
            kind,
            value: value.into(),
        }
    }
}

/// Grammar and comparison rules of one identifier kind
pub trait IdKind {
    /// Protocol name of the identifier, used in error messages
    const NAME: &'static str;

    /// Ordinal comparison instead of the default case-insensitive one
    const CASE_SENSITIVE: bool = false;

    /// Maximum length in characters for free-text identifiers
    const MAX_LENGTH: Option<usize> = None;

    /// Only the presets are legal values
    const CLOSED_VOCABULARY: bool = false;

    fn grammar() -> Option<&'static Regex> {
        None
    }

    /// Pre-registered values, matched case-insensitively by `parse`
    fn presets() -> &'static [&'static str] {
        &[]
    }
}

/// Immutable text-backed identifier of kind `K`
pub struct TextId<K> {
    value: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K: IdKind> TextId<K> {
    /// Parse and validate `text` against the grammar of `K`
    pub fn parse(text: &str) -> Result<Self, IdentifierError> {
        if text.trim().is_empty() {
            return Err(IdentifierError::invalid(K::NAME, text));
        }

        if let Some(max) = K::MAX_LENGTH {
            if text.chars().count() > max {
                return Err(IdentifierError::invalid(K::NAME, text));
            }
        }

        if let Some(preset) = K::presets()
            .iter()
            .find(|preset| preset.eq_ignore_ascii_case(text))
        {
            return Ok(Self::from_canonical(*preset));
        }

        if K::CLOSED_VOCABULARY {
            return Err(IdentifierError::invalid(K::NAME, text));
        }

        match K::grammar() {
            Some(grammar) if !grammar.is_match(text) => {
                Err(IdentifierError::invalid(K::NAME, text))
            }
            _ => Ok(Self::from_canonical(text)),
        }
    }

    /// Like [`parse`](Self::parse) but without the error detail
    pub fn try_parse(text: &str) -> Option<Self> {
        Self::parse(text).ok()
    }

    /// All pre-registered values of this kind
    pub fn presets() -> impl Iterator<Item = Self> {
        K::presets().iter().map(|preset| Self::from_canonical(*preset))
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }

    /// Length of the canonical text in bytes
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    fn from_canonical(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _kind: PhantomData,
        }
    }

    fn folded(&self) -> impl Iterator<Item = char> + '_ {
        self.value.chars().flat_map(char::to_uppercase)
    }
}

impl<K> Clone for TextId<K> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: IdKind> fmt::Debug for TextId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", K::NAME, self.value)
    }
}

impl<K> fmt::Display for TextId<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<K> AsRef<str> for TextId<K> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<K: IdKind> Ord for TextId<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        if K::CASE_SENSITIVE {
            self.value.cmp(&other.value)
        } else {
            self.folded().cmp(other.folded())
        }
    }
}

impl<K: IdKind> PartialOrd for TextId<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: IdKind> PartialEq for TextId<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: IdKind> Eq for TextId<K> {}

impl<K: IdKind> Hash for TextId<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if K::CASE_SENSITIVE {
            self.value.hash(state);
        } else {
            for c in self.folded() {
                c.hash(state);
            }
            state.write_u8(0xff);
        }
    }
}

impl<K: IdKind> FromStr for TextId<K> {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<K: IdKind> TryFrom<&str> for TextId<K> {
    type Error = IdentifierError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl<K> Serialize for TextId<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, K: IdKind> Deserialize<'de> for TextId<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Case-insensitive ordering of ASCII suffixes shared by the composite ids
pub(crate) fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|b| b.to_ascii_uppercase())
        .cmp(b.bytes().map(|b| b.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct CodeKind;

    impl IdKind for CodeKind {
        const NAME: &'static str = "Code";
        const MAX_LENGTH: Option<usize> = Some(5);

        fn grammar() -> Option<&'static Regex> {
            grammar!(r"^[A-Za-z0-9]+$")
        }
    }

    type Code = TextId<CodeKind>;

    #[test]
    fn parse_rejects_empty_and_overlong_text() {
        assert!(Code::parse("").is_err());
        assert!(Code::parse("   ").is_err());
        assert!(Code::parse("abcdef").is_err());
        assert!(Code::parse("ab-c").is_err());
    }

    #[test]
    fn parse_rejects_surrounding_whitespace() {
        assert!(Code::parse("  ab1 ").is_err());
        assert!(Code::parse("ab1 ").is_err());
        assert_eq!(Code::parse("ab1").unwrap().as_str(), "ab1");
    }

    #[test]
    fn comparison_ignores_case_and_hash_agrees() {
        let lower = Code::parse("abc").unwrap();
        let upper = Code::parse("ABC").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.cmp(&upper), Ordering::Equal);

        let set: HashSet<Code> = [lower, upper].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn original_spelling_is_preserved() {
        let id = Code::parse("aBc").unwrap();
        assert_eq!(id.to_string(), "aBc");
        assert_eq!(id.len(), 3);
        assert!(!id.is_empty());
    }

    #[test]
    fn clone_is_value_identical() {
        let id = Code::parse("xyz").unwrap();
        let copy = id.clone();
        drop(id);
        assert_eq!(copy.as_str(), "xyz");
    }

    #[test]
    fn serde_revalidates_on_the_way_in() {
        let id: Code = serde_json::from_str("\"ab1\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ab1\"");
        assert!(serde_json::from_str::<Code>("\"a b\"").is_err());
    }

    #[test]
    fn error_names_the_identifier_kind() {
        let err = Code::parse("!!").unwrap_err();
        assert_eq!(err.to_string(), "Invalid Code format: '!!'");
    }
}
