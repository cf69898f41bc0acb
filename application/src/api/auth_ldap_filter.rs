//! `GetAuthLdapFilter` endpoint definitions.

use axum::{
    extract::{rejection::QueryRejection, Query},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use service::{
    domain::ldap::{server, Filter},
    query::ldap_server,
    Query as _,
};

use crate::{define_error, AsError, Error};

use super::SPAN_NAME;

/// Query parameters of the `GetAuthLdapFilter` endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Params {
    /// ID of the directory server.
    pub id: Option<String>,
}

/// Response of the `GetAuthLdapFilter` endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct Response {
    /// Filter matching all the users of the directory server.
    pub filter: Filter,
}

define_error! {
    enum ParamsError {
        #[code = "INVALID_SERVER_ID"]
        #[status = BAD_REQUEST]
        #[message = "`id` must be a directory server ID"]
        Id,
    }
}

/// Returns the default filter of a directory server, to prefill a new LDAP
/// question with.
///
/// # Errors
///
/// Responds with `400 Bad Request` if the `id` is missing or doesn't
/// reference a directory server.
#[tracing::instrument(
    skip_all,
    fields(
        http.handler = "GetAuthLdapFilter",
        otel.name = SPAN_NAME,
    ),
)]
pub async fn handle<Dir>(
    Extension(service): Extension<service::Service<Dir>>,
    query: Result<Query<Params>, QueryRejection>,
) -> Result<Json<Response>, Error>
where
    Dir: Sync,
{
    let Query(Params { id }) = query.map_err(AsError::into_error)?;
    let id = id
        .and_then(|id| id.trim().parse::<server::Id>().ok())
        .ok_or_else(|| Error::from(ParamsError::Id))?;

    service
        .execute(ldap_server::DefaultFilter(id))
        .await
        .map(|filter| Json(Response { filter }))
        .map_err(AsError::into_error)
}

impl AsError for ldap_server::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SERVER_NOT_EXISTS"]
                #[status = BAD_REQUEST]
                #[message = "Directory server doesn't exist"]
                ServerNotExists,
            }
        }

        match self {
            Self::ServerNotExists(_) => Some(Error::ServerNotExists.into()),
        }
    }
}
