// sensiscan-core/src/engines/mod.rs
//! This module contains `MatchingEngine` implementations.
//!
//! Each engine is a separate file within this directory. `sql_engine` runs the
//! bounded cross-database join against the session's SQLite connection.
//!
//! # License
//! MIT OR APACHE 2.0

pub mod sql_engine;
