//! Shared helpers.

pub mod sanitize;
