// sensiscan/src/lib.rs
//! # Sensiscan CLI Application
//!
//! This crate provides the command-line interface for the `sensiscan-core`
//! discovery engine: argument parsing, logger setup and terminal output.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
