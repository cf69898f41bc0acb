//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use std::{collections::HashMap, sync::Arc};

use crate::domain::{
    ldap::{attribute, server, Attribute, Server},
    question, Question,
};
#[cfg(doc)]
use crate::infra::Directory;

pub use self::query::Query;

/// [`Service`] configuration.
///
/// Catalog of the directory [`Server`]s, [`Attribute`] mappings and
/// [`Question`]s the [`Service`] answers.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Directory [`Server`]s by their IDs.
    pub servers: HashMap<server::Id, Server>,

    /// [`Attribute`] mappings by their IDs.
    pub attributes: HashMap<attribute::Id, Attribute>,

    /// [`Question`]s by their IDs.
    pub questions: HashMap<question::Id, Question>,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Dir> {
    /// Configuration of this [`Service`].
    config: Arc<Config>,

    /// [`Directory`] of this [`Service`].
    directory: Dir,
}

impl<Dir> Service<Dir> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Arc<Config>, directory: Dir) -> Self {
        Self { config, directory }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Directory`] of this [`Service`].
    #[must_use]
    pub fn directory(&self) -> &Dir {
        &self.directory
    }
}
