//! Jeevesctl library - exposes modules for integration tests.

pub mod commands;
pub mod output;
pub mod runlog;
