//! Value sanitation for everything the engine hands back.
//!
//! Names discovered in metadata catalogs and rows read from the catalog tables
//! may contain control characters or byte sequences that are not valid text.
//! This module strips them before any other component sees the value.

pub mod text;
