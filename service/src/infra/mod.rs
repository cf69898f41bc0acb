//! Infrastructure layer.

pub mod directory;

pub use self::directory::Directory;
#[cfg(feature = "ldap")]
pub use self::directory::{ldap, Ldap};
#[cfg(any(test, feature = "memory"))]
pub use self::directory::{memory, Memory};
