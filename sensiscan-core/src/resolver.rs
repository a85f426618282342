// sensiscan-core/src/resolver.rs
//! Type compatibility: which candidate column types are worth comparing
//! against a reference field's type.
//!
//! Resolution has two tiers. The operator-maintained equivalence table in the
//! catalog answers first; only if that table is unavailable does a fixed
//! partition of built-in types answer. The result is tagged with the tier so
//! callers and tests can tell them apart.
//!
//! License: MIT OR APACHE 2.0

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::catalog::CatalogStore;

const TEXTUAL: &[&str] = &["varchar", "char", "nvarchar", "nchar", "text", "ntext"];
const INTEGRAL: &[&str] = &["int", "integer", "smallint", "bigint", "tinyint"];
const FRACTIONAL: &[&str] = &["float", "real", "decimal", "numeric", "money", "smallmoney"];
const TEMPORAL: &[&str] = &["date", "datetime", "datetime2", "smalldatetime"];

/// Comparable type names for one reference type, tagged with the tier that answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparableTypes {
    /// The equivalence table answered (possibly with nothing).
    Configured(BTreeSet<String>),
    /// The equivalence table was unavailable; the built-in partition answered.
    BuiltIn(BTreeSet<String>),
}

impl ComparableTypes {
    pub fn types(&self) -> &BTreeSet<String> {
        match self {
            ComparableTypes::Configured(t) | ComparableTypes::BuiltIn(t) => t,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, ComparableTypes::Configured(_))
    }

    /// Whether a column declared as `declared_type` should be compared.
    ///
    /// Engines report size-parameterised names such as `varchar(50)`, so this is
    /// a containment test on the lower-cased declared type, not equality.
    ///
    /// ```
    /// use sensiscan_core::resolver::{builtin_comparable_types, ComparableTypes};
    ///
    /// let types = ComparableTypes::BuiltIn(builtin_comparable_types("VARCHAR"));
    /// assert!(types.admits("NVARCHAR(50)"));
    /// assert!(!types.admits("datetime2"));
    /// ```
    pub fn admits(&self, declared_type: &str) -> bool {
        let declared = declared_type.trim().to_lowercase();
        !declared.is_empty()
            && self
                .types()
                .iter()
                .any(|t| !t.is_empty() && declared.contains(t.as_str()))
    }
}

/// Resolves the comparable types for a reference type.
pub trait TypeResolver {
    fn comparable_types(&self, reference_type: &str) -> ComparableTypes;
}

/// The fixed fallback partition, matched case-insensitively. A type outside
/// every bucket is only comparable to itself.
pub fn builtin_comparable_types(reference_type: &str) -> BTreeSet<String> {
    let normalized = reference_type.trim().to_lowercase();
    [TEXTUAL, INTEGRAL, FRACTIONAL, TEMPORAL]
        .into_iter()
        .find(|bucket| bucket.contains(&normalized.as_str()))
        .map(|bucket| bucket.iter().map(|t| t.to_string()).collect())
        .unwrap_or_else(|| BTreeSet::from([normalized]))
}

/// `TypeResolver` that consults the catalog's equivalence table first.
pub struct CatalogTypeResolver<'a> {
    catalog: &'a dyn CatalogStore,
}

impl<'a> CatalogTypeResolver<'a> {
    pub fn new(catalog: &'a dyn CatalogStore) -> Self {
        Self { catalog }
    }
}

impl TypeResolver for CatalogTypeResolver<'_> {
    fn comparable_types(&self, reference_type: &str) -> ComparableTypes {
        match self.catalog.comparable_types(reference_type) {
            Ok(types) => {
                let set: BTreeSet<String> = types.iter().map(|t| t.trim().to_lowercase()).collect();
                debug!("Configured comparable types for '{}': {:?}", reference_type, set);
                ComparableTypes::Configured(set)
            }
            Err(e) => {
                warn!(
                    "Type equivalence table unavailable ({}); using built-in buckets for '{}'",
                    e, reference_type
                );
                ComparableTypes::BuiltIn(builtin_comparable_types(reference_type))
            }
        }
    }
}
