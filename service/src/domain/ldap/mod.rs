//! Directory server definitions.

pub mod attribute;
pub mod filter;
pub mod server;

pub use self::{attribute::Attribute, filter::Filter, server::Server};
