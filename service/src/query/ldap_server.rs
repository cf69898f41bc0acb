//! [`Query`] collection related to a single directory [`Server`].

use derive_more::{Display, Error};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::ldap::Server;
use crate::{
    domain::ldap::{server, Filter},
    Service,
};

use super::Query;

/// Queries the [`Filter`] matching all the users of a [`Server`].
#[derive(Clone, Copy, Debug)]
pub struct DefaultFilter(pub server::Id);

impl<Dir: Sync> Query<DefaultFilter> for Service<Dir> {
    type Ok = Filter;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        DefaultFilter(id): DefaultFilter,
    ) -> Result<Self::Ok, Self::Err> {
        self.config()
            .servers
            .get(&id)
            .map(server::Server::default_filter)
            .ok_or_else(|| tracerr::new!(ExecutionError::ServerNotExists(id)))
    }
}

/// Error of [`DefaultFilter`] [`Query`] execution.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ExecutionError {
    /// [`Server`] with the provided ID doesn't exist.
    #[display("`Server(id: {_0})` doesn't exist")]
    ServerNotExists(#[error(not(source))] server::Id),
}

#[cfg(test)]
mod spec {
    use std::{collections::HashMap, sync::Arc, time::Duration};

    use crate::{
        domain::ldap::{server::Security, Server},
        infra::Memory,
        Config, Query as _, Service,
    };

    use super::{DefaultFilter, ExecutionError};

    fn service() -> Service<Memory> {
        let server = Server {
            id: 1.into(),
            name: "openldap".to_owned(),
            host: "openldap".to_owned(),
            port: 389,
            security: Security::None,
            base_dn: "dc=glpi,dc=org".to_owned(),
            bind: None,
            page_size: 100,
            can_support_pagesize: true,
            login_field: "uid".to_owned(),
            condition: Some("(objectClass=inetOrgPerson)".to_owned()),
            connection_timeout: Duration::from_secs(1),
        };
        let config = Config {
            servers: HashMap::from([(server.id, server)]),
            ..Config::default()
        };
        Service::new(Arc::new(config), Memory::default())
    }

    #[tokio::test]
    async fn builds_filter_of_server() {
        let filter = service().execute(DefaultFilter(1.into())).await.unwrap();

        assert_eq!(filter.as_ref(), "(& (uid=*) (objectClass=inetOrgPerson))");
    }

    #[tokio::test]
    async fn fails_on_unknown_server() {
        let err = service().execute(DefaultFilter(2.into())).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ServerNotExists(_)));
    }
}
