//! LDAP [`Directory`] implementation backed by [`ldap3`].

use derive_more::{Display, Error as StdError};
use ldap3::{
    controls::{Control, ControlType, MakeCritical as _, PagedResults},
    DerefAliases, LdapConnAsync, LdapConnSettings, LdapError, Scope,
    SearchEntry, SearchOptions, SearchResult,
};
use secrecy::ExposeSecret as _;
use tracerr::Traced;

use crate::{
    domain::ldap::{server::Security, Server},
    infra::directory::{self, Batch, Cookie, Entry, Request},
};
#[cfg(doc)]
use crate::infra::Directory;

/// Result code of a search stopped on the requested size limit.
const SIZE_LIMIT_EXCEEDED: u32 = 4;

/// Result code of a search stopped on a server administrative limit.
const ADMIN_LIMIT_EXCEEDED: u32 = 11;

/// LDAP [`Directory`] client.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ldap;

impl directory::Directory for Ldap {
    type Connection = Connection;

    async fn connect(
        &self,
        server: &Server,
    ) -> Result<Self::Connection, Traced<directory::Error>> {
        let url = server.url();
        let settings = LdapConnSettings::new()
            .set_conn_timeout(server.connection_timeout)
            .set_starttls(server.security == Security::StartTls);

        tracing::debug!(%url, "connecting to LDAP server");
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
            .await
            .map_err(|source| Error::Connect {
                url: url.clone(),
                source,
            })
            .map_err(tracerr::from_and_wrap!(=> directory::Error))?;

        drop(tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::warn!(error = %e, "LDAP connection driver failed");
            }
        }));

        if let Some(bind) = &server.bind {
            let bound = ldap
                .simple_bind(&bind.dn, bind.password.expose_secret())
                .await
                .and_then(ldap3::LdapResult::success);
            if let Err(source) = bound {
                if let Err(e) = ldap.unbind().await {
                    tracing::warn!(error = %e, "failed to unbind LDAP connection");
                }
                return Err(tracerr::new!(directory::Error::from(
                    Error::Bind {
                        dn: bind.dn.clone(),
                        source,
                    }
                )));
            }
        }

        Ok(Connection(ldap))
    }
}

/// Opened [`Ldap`] connection.
#[derive(Debug)]
pub struct Connection(ldap3::Ldap);

impl directory::Connection for Connection {
    async fn search(
        &mut self,
        request: &Request<'_>,
    ) -> Result<Batch, Traced<directory::Error>> {
        let ldap = self
            .0
            .with_search_options(SearchOptions::new().deref(DerefAliases::Never));
        if let Some(paging) = &request.paging {
            let size = i32::try_from(paging.size.get()).unwrap_or(i32::MAX);
            _ = ldap.with_controls(
                PagedResults {
                    size,
                    cookie: paging.cookie.as_bytes().to_vec(),
                }
                .critical(),
            );
        }

        let SearchResult(entries, result) = ldap
            .search(
                request.base_dn,
                Scope::Subtree,
                request.filter.as_ref(),
                vec![request.attribute.as_ref()],
            )
            .await
            .map_err(Error::Search)
            .map_err(tracerr::from_and_wrap!(=> directory::Error))?;

        let size_limit_exceeded = check_result(result.rc, result.text)
            .map_err(tracerr::from_and_wrap!(=> directory::Error))?;
        let cookie =
            request.paging.as_ref().map(|_| paged_cookie(&result.ctrls));

        Ok(Batch {
            entries: entries
                .into_iter()
                .map(SearchEntry::construct)
                .map(|e| Entry {
                    dn: e.dn,
                    attrs: e.attrs,
                })
                .collect(),
            cookie,
            size_limit_exceeded,
        })
    }

    async fn close(mut self) {
        if let Err(e) = self.0.unbind().await {
            tracing::warn!(error = %e, "failed to unbind LDAP connection");
        }
    }
}

/// Classifies the result code of a finished search.
///
/// Returns whether the search was stopped on a size limit, which still
/// yields usable entries.
fn check_result(rc: u32, text: String) -> Result<bool, Error> {
    match rc {
        0 => Ok(false),
        SIZE_LIMIT_EXCEEDED | ADMIN_LIMIT_EXCEEDED => {
            tracing::debug!(rc, %text, "LDAP search stopped on size limit");
            Ok(true)
        }
        rc => Err(Error::Result { rc, text }),
    }
}

/// Extracts the paged results [`Cookie`] from the response controls.
///
/// Missing control means the search is complete.
fn paged_cookie(ctrls: &[Control]) -> Cookie {
    ctrls
        .iter()
        .find_map(|ctrl| match ctrl {
            Control(Some(ControlType::PagedResults), raw) => {
                Some(raw.parse::<PagedResults>().cookie)
            }
            Control(..) => None,
        })
        .map(Cookie::from)
        .unwrap_or_default()
}

/// [`Ldap`] directory error.
#[derive(Debug, Display, StdError)]
pub enum Error {
    /// Failed to connect to a server.
    #[display("Failed to connect to `{url}`: {source}")]
    Connect {
        /// URL of the server.
        url: String,

        /// Cause of the failure.
        source: LdapError,
    },

    /// Server refused the bind credentials.
    #[display("Failed to bind as `{dn}`: {source}")]
    Bind {
        /// DN the bind was performed as.
        dn: String,

        /// Cause of the failure.
        source: LdapError,
    },

    /// Search failed on the transport level.
    #[display("Search failed: {_0}")]
    Search(LdapError),

    /// Search completed with an error result code.
    #[display("Search failed with result code {rc}: {text}")]
    Result {
        /// Result code returned by the server.
        rc: u32,

        /// Diagnostic message returned by the server.
        text: String,
    },
}

#[cfg(test)]
mod spec {
    use ldap3::controls::{Control, ControlType, PagedResults, RawControl};

    use super::{check_result, paged_cookie, Error};
    use crate::infra::directory::Cookie;

    fn paged(cookie: &[u8]) -> Control {
        Control(
            Some(ControlType::PagedResults),
            RawControl::from(PagedResults {
                size: 0,
                cookie: cookie.to_vec(),
            }),
        )
    }

    #[test]
    fn success_is_not_size_limited() {
        assert!(!check_result(0, String::new()).unwrap());
    }

    #[test]
    fn size_and_admin_limits_are_tolerated() {
        assert!(check_result(4, "Size limit exceeded".into()).unwrap());
        assert!(
            check_result(11, "Admin limit exceeded".into()).unwrap(),
        );
    }

    #[test]
    fn other_result_codes_fail() {
        let err = check_result(32, "No such object".into()).unwrap_err();

        assert!(
            matches!(
                err,
                Error::Result { rc: 32, ref text } if text == "No such object",
            ),
            "unexpected: {err}",
        );
    }

    #[test]
    fn reads_paged_cookie() {
        assert_eq!(
            paged_cookie(&[paged(&[0, 0, 7])]),
            Cookie::from(vec![0, 0, 7]),
        );
    }

    #[test]
    fn missing_paged_control_is_empty_cookie() {
        assert!(paged_cookie(&[]).is_empty());

        let other = Control(
            None,
            RawControl {
                ctype: "1.2.840.113556.1.4.473".to_owned(),
                crit: false,
                val: None,
            },
        );
        assert!(paged_cookie(&[other]).is_empty());
        assert!(paged_cookie(&[paged(&[])]).is_empty());
    }
}
