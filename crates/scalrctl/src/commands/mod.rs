//! Command implementations

pub mod example;
pub mod list;
pub mod profile;
