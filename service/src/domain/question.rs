//! [`Question`] definitions.

use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};

use crate::domain::{
    form::Form,
    ldap::{attribute, server, Filter},
};

/// Form question answered with a value picked from a directory server.
#[derive(Clone, Debug)]
pub struct Question {
    /// ID of this [`Question`].
    pub id: Id,

    /// Name of this [`Question`].
    pub name: String,

    /// [`Form`] this [`Question`] belongs to.
    pub form: Form,

    /// [`LdapSelect`] configuration of this [`Question`].
    pub config: LdapSelect,
}

/// ID of a [`Question`].
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

/// Configuration of a [`Question`] picking its answer from a directory
/// server.
///
/// Stored by the host application as a JSON object, which keys are all
/// optional.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LdapSelect {
    /// ID of the [`Server`] to search on.
    ///
    /// [`Server`]: crate::domain::ldap::Server
    #[serde(rename = "authldap_id")]
    pub server_id: server::Id,

    /// [`Filter`] selecting the entries to pick from.
    #[serde(rename = "ldap_filter")]
    pub filter: Filter,

    /// ID of the [`Attribute`] mapping which values are picked.
    ///
    /// [`Attribute`]: crate::domain::ldap::Attribute
    #[serde(rename = "ldap_attribute_id")]
    pub attribute_id: attribute::Id,
}

#[cfg(test)]
mod spec {
    use serde_json::json;

    use super::LdapSelect;
    use crate::domain::ldap::Filter;

    #[test]
    fn deserializes_with_defaults() {
        let config: LdapSelect = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, LdapSelect::default());
        assert_eq!(u32::from(config.server_id), 0);
        assert_eq!(config.filter.as_ref(), "");
        assert_eq!(u32::from(config.attribute_id), 0);

        let config: LdapSelect =
            serde_json::from_value(json!({ "ldap_filter": "(uid=*)" }))
                .unwrap();
        assert_eq!(config.filter, Filter::new("(uid=*)"));
        assert_eq!(u32::from(config.server_id), 0);
    }

    #[test]
    fn serializes_all_keys() {
        let config = LdapSelect {
            server_id: 3.into(),
            filter: Filter::new("(objectClass=*)"),
            attribute_id: 7.into(),
        };

        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({
                "authldap_id": 3,
                "ldap_filter": "(objectClass=*)",
                "ldap_attribute_id": 7,
            }),
        );
    }
}
