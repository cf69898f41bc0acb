//! [`Filter`] definitions.

use derive_more::{AsRef, Display, From, Into};
use ldap3::ldap_escape;
use serde::{Deserialize, Serialize};

use super::Attribute;

/// Directory search filter expression.
///
/// The expression is never validated: it's passed to the directory server
/// verbatim.
#[derive(
    AsRef,
    Clone,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Into,
    PartialEq,
    Serialize,
)]
#[as_ref(str)]
#[serde(transparent)]
pub struct Filter(String);

impl Filter {
    /// Creates a new [`Filter`] out of the provided expression.
    #[must_use]
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    /// Restricts this [`Filter`] to entries which `attribute` contains the
    /// provided `text`.
    ///
    /// The `text` is escaped as an assertion value, as specified in
    /// [RFC 4515], so it cannot alter the structure of this [`Filter`]. This
    /// [`Filter`] is returned unchanged if the `text` is empty.
    ///
    /// [RFC 4515]: https://datatracker.ietf.org/doc/html/rfc4515#section-3
    #[must_use]
    pub fn matching(&self, attribute: &Attribute, text: &str) -> Self {
        if text.is_empty() {
            return self.clone();
        }
        Self(format!("(&{}({attribute}=*{}*))", self.0, ldap_escape(text)))
    }
}

#[cfg(test)]
mod spec {
    use super::{Attribute, Filter};

    fn uid() -> Attribute {
        Attribute::new("uid").unwrap()
    }

    #[test]
    fn empty_text_keeps_filter() {
        let filter = Filter::new("(objectClass=inetOrgPerson)");

        assert_eq!(filter.matching(&uid(), ""), filter);
    }

    #[test]
    fn text_is_conjoined_with_filter() {
        let filter = Filter::new("(objectClass=inetOrgPerson)");

        assert_eq!(
            filter.matching(&uid(), "brazil").as_ref(),
            "(&(objectClass=inetOrgPerson)(uid=*brazil*))",
        );
    }

    #[test]
    fn filter_is_used_verbatim() {
        let filter = Filter::new("(& (uid=*) (!(cn=admin)))");

        assert_eq!(
            filter.matching(&uid(), "pierre").as_ref(),
            "(&(& (uid=*) (!(cn=admin)))(uid=*pierre*))",
        );
    }

    #[test]
    fn text_is_escaped() {
        let filter = Filter::new("(objectClass=*)");

        assert_eq!(
            filter.matching(&uid(), "a*)(cn=x\\").as_ref(),
            r"(&(objectClass=*)(uid=*a\2a\29\28cn=x\5c*))",
        );
        assert_eq!(
            filter.matching(&uid(), "\0nul").as_ref(),
            r"(&(objectClass=*)(uid=*\00nul*))",
        );
        assert_eq!(
            filter.matching(&uid(), "é(ü)").as_ref(),
            r"(&(objectClass=*)(uid=*é\28ü\29*))",
        );
    }
}
