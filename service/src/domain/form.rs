//! [`Form`] definitions.

use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};

/// Form owning questions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Form {
    /// ID of this [`Form`].
    pub id: Id,

    /// Indicator whether this [`Form`] is active and may be read by users.
    pub is_active: bool,
}

/// ID of a [`Form`].
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
