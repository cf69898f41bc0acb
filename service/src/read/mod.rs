//! Read entities definitions.

pub mod dropdown;
