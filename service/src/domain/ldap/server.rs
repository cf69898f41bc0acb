//! [`Server`] definitions.

use std::{num::NonZeroU32, time::Duration};

use derive_more::{Display, From, FromStr, Into};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::Filter;

/// Directory server the LDAP questions are answered from.
#[derive(Clone, Debug)]
pub struct Server {
    /// ID of this [`Server`].
    pub id: Id,

    /// Human-readable name of this [`Server`].
    pub name: String,

    /// Host to connect to.
    pub host: String,

    /// Port to connect to.
    pub port: u16,

    /// [`Security`] of the connection.
    pub security: Security,

    /// DN every search is rooted at.
    pub base_dn: String,

    /// Credentials to bind with, if any.
    pub bind: Option<Bind>,

    /// Number of entries the server returns per paged search round-trip.
    pub page_size: u32,

    /// Indicator whether this [`Server`] supports the paged results control.
    pub can_support_pagesize: bool,

    /// Attribute holding user logins.
    pub login_field: String,

    /// Additional filter restricting the users of this [`Server`].
    pub condition: Option<String>,

    /// Timeout of establishing a connection.
    pub connection_timeout: Duration,
}

impl Server {
    /// Returns the number of entries to request per round-trip if this
    /// [`Server`] supports paged searches.
    #[must_use]
    pub fn paging(&self) -> Option<NonZeroU32> {
        if self.can_support_pagesize {
            NonZeroU32::new(self.page_size)
        } else {
            None
        }
    }

    /// Returns URL to connect to this [`Server`] with.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = match self.security {
            Security::None | Security::StartTls => "ldap",
            Security::Ldaps => "ldaps",
        };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    /// Returns the [`Filter`] matching all the users of this [`Server`].
    #[must_use]
    pub fn default_filter(&self) -> Filter {
        Filter::new(format!(
            "(& ({}=*) {})",
            self.login_field,
            self.condition.as_deref().unwrap_or_default(),
        ))
    }
}

/// ID of a [`Server`].
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

/// Security of a [`Server`] connection.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Security {
    /// Plain connection.
    #[default]
    None,

    /// Plain connection upgraded with `StartTLS`.
    StartTls,

    /// TLS connection.
    Ldaps,
}

/// Credentials to bind to a [`Server`] with.
#[derive(Clone, Debug)]
pub struct Bind {
    /// DN to bind as.
    pub dn: String,

    /// Password to bind with.
    pub password: SecretString,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{Id, Security, Server};

    fn server() -> Server {
        Server {
            id: Id::from(1),
            name: "openldap".to_owned(),
            host: "localhost".to_owned(),
            port: 3890,
            security: Security::None,
            base_dn: "dc=glpi,dc=org".to_owned(),
            bind: None,
            page_size: 100,
            can_support_pagesize: true,
            login_field: "uid".to_owned(),
            condition: None,
            connection_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn paging_requires_capability_and_size() {
        assert_eq!(server().paging().map(|s| s.get()), Some(100));

        let mut s = server();
        s.can_support_pagesize = false;
        assert_eq!(s.paging(), None);

        let mut s = server();
        s.page_size = 0;
        assert_eq!(s.paging(), None);
    }

    #[test]
    fn url_depends_on_security() {
        let mut s = server();
        assert_eq!(s.url(), "ldap://localhost:3890");

        s.security = Security::StartTls;
        assert_eq!(s.url(), "ldap://localhost:3890");

        s.security = Security::Ldaps;
        assert_eq!(s.url(), "ldaps://localhost:3890");
    }

    #[test]
    fn default_filter() {
        let mut s = server();
        assert_eq!(s.default_filter().as_ref(), "(& (uid=*) )");

        s.condition = Some("(objectClass=inetOrgPerson)".to_owned());
        assert_eq!(
            s.default_filter().as_ref(),
            "(& (uid=*) (objectClass=inetOrgPerson))",
        );
    }
}
