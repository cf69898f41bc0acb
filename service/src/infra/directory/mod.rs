//! [`Directory`]-related implementations.

#[cfg(feature = "ldap")]
pub mod ldap;
#[cfg(any(test, feature = "memory"))]
pub mod memory;

use std::{collections::HashMap, future::Future, num::NonZeroU32};

use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;

use crate::domain::ldap::{Attribute, Filter, Server};

#[cfg(feature = "ldap")]
pub use self::ldap::Ldap;
#[cfg(any(test, feature = "memory"))]
pub use self::memory::Memory;

/// Directory server client opening [`Connection`]s to [`Server`]s.
pub trait Directory {
    /// [`Connection`] opened by this [`Directory`].
    type Connection: Connection + Send;

    /// Opens a new [`Connection`] to the provided [`Server`], binding with
    /// its credentials, if any.
    ///
    /// # Errors
    ///
    /// If the [`Server`] is unreachable or refuses the credentials.
    fn connect(
        &self,
        server: &Server,
    ) -> impl Future<Output = Result<Self::Connection, Traced<Error>>> + Send;
}

/// Opened connection to a directory server.
pub trait Connection {
    /// Performs a single search round-trip.
    ///
    /// # Errors
    ///
    /// If the server fails the search with anything but a size limit.
    fn search(
        &mut self,
        request: &Request<'_>,
    ) -> impl Future<Output = Result<Batch, Traced<Error>>> + Send;

    /// Closes this [`Connection`].
    ///
    /// Closing never fails: any error is only logged.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Subtree search round-trip request.
#[derive(Clone, Debug)]
pub struct Request<'a> {
    /// DN the search is rooted at.
    pub base_dn: &'a str,

    /// [`Filter`] the entries should match.
    pub filter: &'a Filter,

    /// The only [`Attribute`] to return.
    pub attribute: &'a Attribute,

    /// [`Paging`] of the search, if the server supports it.
    pub paging: Option<Paging>,
}

/// Paged results control of a [`Request`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Paging {
    /// Number of entries to return per round-trip.
    pub size: NonZeroU32,

    /// [`Cookie`] returned by the previous round-trip.
    pub cookie: Cookie,
}

/// Opaque continuation token of a paged search.
///
/// An empty [`Cookie`] starts a new search when sent, and signals the search
/// completion when received.
#[derive(Clone, Debug, Default, Eq, From, PartialEq)]
pub struct Cookie(Vec<u8>);

impl Cookie {
    /// Indicates whether this [`Cookie`] is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns raw bytes of this [`Cookie`].
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Entries returned by a single [`Request`] round-trip.
#[derive(Clone, Debug, Default)]
pub struct Batch {
    /// Returned [`Entry`]s in the server order.
    pub entries: Vec<Entry>,

    /// [`Cookie`] to continue the search with, if it was paged.
    pub cookie: Option<Cookie>,

    /// Indicator whether the server stopped the search on its size or
    /// administrative limit.
    pub size_limit_exceeded: bool,
}

/// Directory entry.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Entry {
    /// DN of this [`Entry`].
    pub dn: String,

    /// Attribute values of this [`Entry`].
    pub attrs: HashMap<String, Vec<String>>,
}

impl Entry {
    /// Creates a new [`Entry`] without attributes.
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attrs: HashMap::new(),
        }
    }

    /// Adds the provided `values` of the `attribute` to this [`Entry`].
    #[must_use]
    pub fn with<V: Into<String>>(
        mut self,
        attribute: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.attrs
            .entry(attribute.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Returns all the values of the provided [`Attribute`].
    pub fn values<'a>(
        &'a self,
        attribute: &'a Attribute,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.attrs
            .iter()
            .filter(|(name, _)| attribute.matches(name))
            .flat_map(|(_, values)| values.iter().map(String::as_str))
    }

    /// Returns the first non-empty value of the provided [`Attribute`].
    #[must_use]
    pub fn value(&self, attribute: &Attribute) -> Option<&str> {
        self.attrs
            .iter()
            .filter(|(name, _)| attribute.matches(name))
            .flat_map(|(_, values)| values)
            .map(String::as_str)
            .find(|v| !v.is_empty())
    }
}

/// [`Directory`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Ldap`] error.
    #[cfg(feature = "ldap")]
    Ldap(ldap::Error),

    /// [`Memory`] error.
    #[cfg(any(test, feature = "memory"))]
    Memory(memory::Error),
}

#[cfg(test)]
mod spec {
    use crate::domain::ldap::Attribute;

    use super::{Cookie, Entry};

    #[test]
    fn value_lookup_is_case_insensitive() {
        let entry = Entry::new("uid=pierre,dc=glpi,dc=org")
            .with("UID", ["pierre"])
            .with("cn", ["Pierre", "P."]);

        let uid = Attribute::new("uid").unwrap();
        assert_eq!(entry.value(&uid), Some("pierre"));

        let cn = Attribute::new("CN").unwrap();
        assert_eq!(entry.values(&cn).collect::<Vec<_>>(), ["Pierre", "P."]);
        assert_eq!(entry.value(&cn), Some("Pierre"));
    }

    #[test]
    fn missing_or_empty_value_is_none() {
        let entry = Entry::new("uid=remi,dc=glpi,dc=org")
            .with("uid", [""])
            .with("cn", Vec::<String>::new());

        assert_eq!(entry.value(&Attribute::new("uid").unwrap()), None);
        assert_eq!(entry.value(&Attribute::new("cn").unwrap()), None);
        assert_eq!(entry.value(&Attribute::new("mail").unwrap()), None);
    }

    #[test]
    fn value_outlives_attribute() {
        let entry = Entry::new("uid=michel,dc=glpi,dc=org")
            .with("uid", ["michel"]);

        let value = {
            let uid = Attribute::new("uid").unwrap();
            entry.value(&uid)
        };
        assert_eq!(value, Some("michel"));
    }

    #[test]
    fn cookie_emptiness() {
        assert!(Cookie::default().is_empty());
        assert!(!Cookie::from(vec![1]).is_empty());
    }
}
