//! [`Query`] definition.

pub mod ldap_dropdown;
pub mod ldap_server;
pub mod slm;

#[cfg(doc)]
use crate::Service;

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;
