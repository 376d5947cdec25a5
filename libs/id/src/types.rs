//! Scheme, category, and prefix types with their validation rules.
//!
//! Validation is pure: no I/O, no clock, no randomness. A value that made it
//! into a [`Category`] or [`Prefix`] has already passed its checks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

// =============================================================================
// Scheme
// =============================================================================

/// Identifier generation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Time-based UUID with node and clock-sequence entropy.
    V1,
    /// Random UUID.
    V4,
    /// Microsecond epoch in uppercase hex, optionally prefixed.
    Timestamp,
}

impl Scheme {
    /// All schemes, in display order.
    pub const ALL: [Scheme; 3] = [Scheme::V1, Scheme::V4, Scheme::Timestamp];

    /// Returns the stored name of this scheme.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V4 => "v4",
            Self::Timestamp => "timestamp",
        }
    }

    /// Returns true if identifiers of this scheme may carry a prefix.
    pub const fn accepts_prefix(&self) -> bool {
        matches!(self, Self::Timestamp)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" => Ok(Self::V1),
            "v4" => Ok(Self::V4),
            "timestamp" => Ok(Self::Timestamp),
            other => Err(ValidationError::UnknownScheme(other.to_string())),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A validated free-form category tag.
///
/// The empty string is a valid category and is distinct from no category.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    /// Maximum category length in characters.
    pub const MAX_LEN: usize = 50;

    /// Validates and wraps a category.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let len = value.chars().count();
        if len > Self::MAX_LEN {
            return Err(ValidationError::CategoryTooLong {
                len,
                max: Self::MAX_LEN,
            });
        }
        Ok(Self(value))
    }

    /// Returns the category as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Category {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Prefix
// =============================================================================

/// A validated, upper-cased timestamp identifier prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Prefix(String);

impl Prefix {
    /// Maximum prefix length in characters.
    pub const MAX_LEN: usize = 5;

    /// Validates a prefix and normalizes it to upper case.
    ///
    /// The rules apply to the upper-cased form, which is what gets stored:
    /// `"ß"` becomes `"SS"` and counts as two characters.
    pub fn new(value: &str) -> Result<Self, ValidationError> {
        let upper = value.to_uppercase();
        let len = upper.chars().count();
        if len > Self::MAX_LEN {
            return Err(ValidationError::PrefixTooLong {
                len,
                max: Self::MAX_LEN,
            });
        }
        if upper.is_empty() || !upper.chars().all(char::is_alphanumeric) {
            return Err(ValidationError::PrefixNotAlphanumeric {
                prefix: value.to_string(),
            });
        }
        Ok(Self(upper))
    }

    /// Returns the normalized prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Prefix {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Prefix> for String {
    fn from(prefix: Prefix) -> Self {
        prefix.0
    }
}

impl AsRef<str> for Prefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Validation entry points
// =============================================================================

/// Validates an optional category. Absent passes.
pub fn validate_category(category: Option<&str>) -> Result<Option<Category>, ValidationError> {
    category.map(Category::new).transpose()
}

/// Validates an optional prefix. Absent passes; present values come back
/// upper-cased.
pub fn validate_prefix(prefix: Option<&str>) -> Result<Option<Prefix>, ValidationError> {
    prefix.map(Prefix::new).transpose()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_scheme_roundtrip() {
        for scheme in Scheme::ALL {
            let parsed: Scheme = scheme.as_str().parse().unwrap();
            assert_eq!(parsed, scheme);
        }
    }

    #[test]
    fn test_scheme_unknown() {
        let result: Result<Scheme, _> = "v3".parse();
        assert_eq!(
            result.unwrap_err(),
            ValidationError::UnknownScheme("v3".to_string())
        );
    }

    #[test]
    fn test_scheme_json_is_lowercase() {
        let json = serde_json::to_string(&Scheme::Timestamp).unwrap();
        assert_eq!(json, "\"timestamp\"");
    }

    #[test]
    fn test_only_timestamp_accepts_prefix() {
        assert!(!Scheme::V1.accepts_prefix());
        assert!(!Scheme::V4.accepts_prefix());
        assert!(Scheme::Timestamp.accepts_prefix());
    }

    #[test]
    fn test_absent_inputs_pass() {
        assert_eq!(validate_category(None).unwrap(), None);
        assert_eq!(validate_prefix(None).unwrap(), None);
    }

    #[test]
    fn test_empty_category_is_distinct_from_absent() {
        let category = validate_category(Some("")).unwrap();
        assert_eq!(category, Some(Category::new("").unwrap()));
        assert_ne!(category, None);
    }

    #[rstest]
    #[case("x", true)]
    #[case("batch", true)]
    #[case(&"a".repeat(50), true)]
    #[case(&"a".repeat(51), false)]
    #[case(&"é".repeat(50), true)]
    #[case(&"é".repeat(51), false)]
    fn test_category_length(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(validate_category(Some(input)).is_ok(), ok);
    }

    #[rstest]
    #[case("ab1", "AB1")]
    #[case("X", "X")]
    #[case("Order", "ORDER")]
    #[case("12345", "12345")]
    fn test_prefix_normalized(#[case] input: &str, #[case] expected: &str) {
        let prefix = validate_prefix(Some(input)).unwrap().unwrap();
        assert_eq!(prefix.as_str(), expected);
    }

    #[rstest]
    #[case("abcdef")]
    #[case("ab-1")]
    #[case("a b")]
    #[case("")]
    #[case("_")]
    fn test_prefix_rejected(#[case] input: &str) {
        let err = validate_prefix(Some(input)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::PrefixTooLong { .. } | ValidationError::PrefixNotAlphanumeric { .. }
        ));
    }

    #[rstest]
    #[case("ßßß", 6)]
    #[case("abcß", 5)]
    #[case("ﬁﬁﬁ", 6)]
    fn test_prefix_length_counts_upper_case_form(#[case] input: &str, #[case] upper_len: usize) {
        match Prefix::new(input) {
            Ok(prefix) => {
                assert_eq!(prefix.as_str().chars().count(), upper_len);
                assert!(upper_len <= Prefix::MAX_LEN);
            }
            Err(err) => {
                assert_eq!(err, ValidationError::PrefixTooLong { len: upper_len, max: 5 });
            }
        }
    }

    #[test]
    fn test_prefix_too_long_reports_length() {
        let err = Prefix::new("abcdef").unwrap_err();
        assert_eq!(err, ValidationError::PrefixTooLong { len: 6, max: 5 });
    }

    #[test]
    fn test_category_rejected_on_deserialize() {
        let json = format!("\"{}\"", "c".repeat(51));
        let result: Result<Category, _> = serde_json::from_str(&json);
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_category_within_limit_passes(s in "\\PC{0,50}") {
            prop_assert!(validate_category(Some(&s)).is_ok());
        }

        #[test]
        fn prop_category_over_limit_fails(s in "\\PC{51,80}") {
            let err = validate_category(Some(&s)).unwrap_err();
            let is_too_long = matches!(err, ValidationError::CategoryTooLong { .. });
            prop_assert!(is_too_long);
        }

        #[test]
        fn prop_alphanumeric_prefix_is_uppercased(s in "[a-zA-Z0-9]{1,5}") {
            let prefix = Prefix::new(&s).unwrap();
            prop_assert_eq!(prefix.as_str(), s.to_uppercase());
        }

        #[test]
        fn prop_unicode_prefix_revalidates(s in "[a-zA-Z0-9ßàéøœåçñﬁﬀ]{1,5}") {
            match Prefix::new(&s) {
                Ok(prefix) => {
                    prop_assert!(prefix.as_str().chars().count() <= Prefix::MAX_LEN);
                    prop_assert_eq!(Prefix::new(prefix.as_str()), Ok(prefix.clone()));
                    prop_assert_eq!(prefix.as_str(), s.to_uppercase());
                }
                Err(err) => {
                    prop_assert!(
                        matches!(err, ValidationError::PrefixTooLong { .. }),
                        "expected too-long error",
                    );
                    prop_assert!(s.to_uppercase().chars().count() > Prefix::MAX_LEN);
                }
            }
        }

        #[test]
        fn prop_long_prefix_fails(s in "[a-zA-Z0-9]{6,12}") {
            prop_assert!(
                matches!(Prefix::new(&s), Err(ValidationError::PrefixTooLong { .. })),
                "expected too-long error",
            );
        }

        #[test]
        fn prop_prefix_with_symbol_fails(head in "[a-z0-9]{0,2}", sym in "[-_./ !@#]", tail in "[a-z0-9]{0,2}") {
            let input = format!("{head}{sym}{tail}");
            prop_assert!(
                matches!(Prefix::new(&input), Err(ValidationError::PrefixNotAlphanumeric { .. })),
                "expected not-alphanumeric error",
            );
        }
    }
}
