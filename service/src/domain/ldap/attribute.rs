//! [`Attribute`] definitions.

use std::{str, sync::LazyLock};

use derive_more::{AsRef, Display, From, FromStr, Into};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Description of a directory entry attribute (`uid`, `cn;lang-fr`,
/// `2.5.4.3`, etc).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str)]
pub struct Attribute(String);

impl Attribute {
    /// Creates a new [`Attribute`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Attribute`] description.
    fn check(name: impl AsRef<str>) -> bool {
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                r"^([A-Za-z][A-Za-z0-9-]*|\d+(\.\d+)*)(;[A-Za-z0-9-]+)*$",
            )
            .expect("valid regex")
        });

        REGEX.is_match(name.as_ref())
    }

    /// Indicates whether this [`Attribute`] names the same attribute as the
    /// provided `other` one.
    ///
    /// Attribute descriptions are case-insensitive.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl str::FromStr for Attribute {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Attribute`")
    }
}

impl<'de> Deserialize<'de> for Attribute {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::new(name.as_str()).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid `Attribute`: `{name}`"))
        })
    }
}

/// ID of an [`Attribute`] mapping.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(u32);

#[cfg(test)]
mod spec {
    use super::Attribute;

    #[test]
    fn accepts_descriptions() {
        for name in ["uid", "cn", "sAMAccountName", "x-custom-1", "cn;lang-fr"]
        {
            assert!(Attribute::new(name).is_some(), "`{name}` rejected");
        }
        assert!(Attribute::new("2.5.4.3").is_some());
    }

    #[test]
    fn rejects_malformed_descriptions() {
        for name in ["", "1cn", "cn=*", "(uid)", "uid ", "cn;", "2.5."] {
            assert!(Attribute::new(name).is_none(), "`{name}` accepted");
        }
    }

    #[test]
    fn matches_case_insensitively() {
        let attr = Attribute::new("sAMAccountName").unwrap();

        assert!(attr.matches("samaccountname"));
        assert!(attr.matches("SAMACCOUNTNAME"));
        assert!(!attr.matches("cn"));
    }

    #[test]
    fn deserializes_only_valid_descriptions() {
        let attr: Attribute = serde_json::from_str(r#""uid""#).unwrap();
        assert_eq!(attr.as_ref(), "uid");

        assert!(serde_json::from_str::<Attribute>(r#""u id""#).is_err());
    }
}
