//! Domain definitions.

pub mod form;
pub mod ldap;
pub mod question;
pub mod slm;

pub use self::question::Question;
