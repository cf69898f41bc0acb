//! Dropdown [`Item`] read model definition.

use derive_more::Display;
use serde::Serialize;

/// Option of a dropdown picked from a directory server.
///
/// The `id` and the `text` are always the same attribute value.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[display("{text}")]
pub struct Item {
    /// Value submitted when this [`Item`] is picked.
    pub id: String,

    /// Value displayed for this [`Item`].
    pub text: String,
}

impl From<String> for Item {
    fn from(value: String) -> Self {
        Self {
            id: value.clone(),
            text: value,
        }
    }
}

impl From<&str> for Item {
    fn from(value: &str) -> Self {
        value.to_owned().into()
    }
}

pub mod list {
    //! [`Item`]s list definitions.

    use common::define_pagination;

    use super::Item;

    define_pagination!(Item);
}
