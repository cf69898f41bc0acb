//! HTTP API definitions.

pub mod auth_ldap_filter;
pub mod ldap_dropdown;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use service::infra::Directory;

/// Name of the [`tracing::Span`] for the API handlers.
const SPAN_NAME: &str = "HTTP handler";

/// Creates a new [`Router`] serving the HTTP API with the provided
/// [`service::Service`].
pub fn router<Dir>(service: service::Service<Dir>) -> Router
where
    Dir: Directory + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/LdapDropdown", post(ldap_dropdown::handle::<Dir>))
        .route("/GetAuthLdapFilter", get(auth_ldap_filter::handle::<Dir>))
        .layer(Extension(service))
}
