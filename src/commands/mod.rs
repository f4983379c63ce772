//! Top-level commands

pub mod import;
