//! Configuration management for `sensiscan-core`.
//!
//! This module defines the scan configuration: where the fleet lives, which
//! databases may be scanned, where the catalog tables are, and the matching
//! policy knobs (classification threshold, overlap cap, sentinel values).
//! It handles YAML loading, the embedded defaults, and validation.
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ScanError;
use crate::validators::is_safe_identifier;

/// Overlap at or above which a candidate is classified as sensitive.
pub const DEFAULT_SENSITIVE_THRESHOLD: u64 = 10_000;
/// Maximum number of distinct matches the matching engine counts.
pub const DEFAULT_OVERLAP_CAP: u64 = 100;
/// SQLite refuses more than 10 attached databases unless rebuilt.
pub const MAX_ATTACHED_LIMIT: usize = 10;

/// Names of the catalog tables in the home database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Schema (file stem) of the home database holding the catalog.
    pub schema: String,
    /// Known sensitive fields.
    pub reference_table: String,
    /// Operator-maintained type equivalences (`datatype_ref`, `datatypecompare`).
    pub comparable_types_table: String,
    /// The processed-pair ledger.
    pub ledger_table: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            schema: "dbo".to_string(),
            reference_table: "ref_cde_data_sensitive".to_string(),
            comparable_types_table: "datatype_compare".to_string(),
            ledger_table: "processed_fields".to_string(),
        }
    }
}

/// Matching and classification policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub sensitive_threshold: u64,
    pub overlap_cap: u64,
    /// Placeholder values never counted as a match on the reference side.
    pub sentinel_values: Vec<String>,
    /// Schema in which reference tables are looked up.
    pub reference_schema: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            sensitive_threshold: DEFAULT_SENSITIVE_THRESHOLD,
            overlap_cap: DEFAULT_OVERLAP_CAP,
            sentinel_values: vec!["N/A".to_string(), "-".to_string()],
            reference_schema: "dbo".to_string(),
        }
    }
}

/// Top-level configuration for a scan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory holding one sub-directory per database.
    pub fleet_root: PathBuf,
    /// Databases that may be scanned. Nothing outside this list is touched.
    pub databases: Vec<String>,
    /// Schemas skipped during discovery (compared case-insensitively).
    pub excluded_schemas: Vec<String>,
    /// File extensions recognised as schema files.
    pub schema_extensions: Vec<String>,
    /// Upper bound on simultaneously attached schema files.
    pub max_attached: usize,
    pub catalog: CatalogConfig,
    pub matching: MatchingConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fleet_root: PathBuf::from("."),
            databases: Vec::new(),
            excluded_schemas: vec![
                "sys".to_string(),
                "INFORMATION_SCHEMA".to_string(),
                "main".to_string(),
                "temp".to_string(),
            ],
            schema_extensions: vec!["sqlite".to_string(), "db".to_string(), "sqlite3".to_string()],
            max_attached: 8,
            catalog: CatalogConfig::default(),
            matching: MatchingConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Loads a configuration from a YAML file. Missing keys take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading scan configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ScanConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        info!(
            "Loaded configuration with {} allow-listed databases from {}.",
            config.databases.len(),
            path.display()
        );
        Ok(config)
    }

    /// Loads the embedded default configuration.
    pub fn load_default() -> Result<Self> {
        debug!("Loading default scan configuration from embedded string...");
        let default_yaml = include_str!("../config/default_scan.yaml");
        let config: ScanConfig =
            serde_yml::from_str(default_yaml).context("Failed to parse default scan configuration")?;
        Ok(config)
    }

    /// Loads `explicit` if given, otherwise the first existing candidate path,
    /// otherwise the embedded defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match config_candidate_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_file(path),
            None => {
                debug!("No configuration file found in candidate locations; using defaults.");
                Self::load_default()
            }
        }
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn with_overrides(
        mut self,
        fleet_root: Option<PathBuf>,
        sensitive_threshold: Option<u64>,
        overlap_cap: Option<u64>,
    ) -> Self {
        if let Some(root) = fleet_root {
            debug!("Overriding fleet root with: {}", root.display());
            self.fleet_root = root;
        }
        if let Some(threshold) = sensitive_threshold {
            debug!("Overriding sensitive threshold with: {}", threshold);
            self.matching.sensitive_threshold = threshold;
        }
        if let Some(cap) = overlap_cap {
            debug!("Overriding overlap cap with: {}", cap);
            self.matching.overlap_cap = cap;
        }
        self
    }

    /// Serializes the effective configuration.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).context("Failed to serialize scan configuration")
    }

    /// `true` when a capped count can never reach the threshold.
    pub fn cap_below_threshold(&self) -> bool {
        self.matching.overlap_cap < self.matching.sensitive_threshold
    }

    /// Validates identifiers and policy values. All problems are reported at
    /// once as a single [`ScanError::InvalidConfig`].
    pub fn validate(&self) -> Result<(), ScanError> {
        let mut errors = Vec::new();

        if self.databases.is_empty() {
            errors.push("`databases` allow-list is empty; nothing would be scanned.".to_string());
        }
        for db in &self.databases {
            if !is_safe_identifier(db) {
                errors.push(format!("Database name '{}' is not a safe identifier.", db));
            }
        }

        let named = [
            ("catalog.schema", &self.catalog.schema),
            ("catalog.reference_table", &self.catalog.reference_table),
            ("catalog.comparable_types_table", &self.catalog.comparable_types_table),
            ("catalog.ledger_table", &self.catalog.ledger_table),
            ("matching.reference_schema", &self.matching.reference_schema),
        ];
        for (key, value) in named {
            if !is_safe_identifier(value) {
                errors.push(format!("`{}` value '{}' is not a safe identifier.", key, value));
            }
        }

        if self.matching.overlap_cap == 0 {
            errors.push("`matching.overlap_cap` must be greater than 0.".to_string());
        }
        if self.matching.sensitive_threshold == 0 {
            errors.push("`matching.sensitive_threshold` must be greater than 0.".to_string());
        }
        if !(2..=MAX_ATTACHED_LIMIT).contains(&self.max_attached) {
            errors.push(format!(
                "`max_attached` must be between 2 and {} (got {}).",
                MAX_ATTACHED_LIMIT, self.max_attached
            ));
        }
        if self.schema_extensions.is_empty() {
            errors.push("`schema_extensions` must list at least one extension.".to_string());
        }

        if !errors.is_empty() {
            return Err(ScanError::InvalidConfig(errors.join("\n")));
        }

        if self.cap_below_threshold() {
            warn!(
                "overlap_cap ({}) is below sensitive_threshold ({}); no candidate can be classified as sensitive.",
                self.matching.overlap_cap, self.matching.sensitive_threshold
            );
        }
        Ok(())
    }
}

/// Locations searched for a configuration file when none is given explicitly.
pub fn config_candidate_paths() -> Vec<PathBuf> {
    let candidates = vec![
        Some(PathBuf::from("./sensiscan.yaml")),
        dirs::home_dir().map(|p| p.join(".sensiscan").join("config.yaml")),
        dirs::config_dir().map(|p| p.join("sensiscan").join("config.yaml")),
        Some(PathBuf::from("/etc/sensiscan/config.yaml")),
    ];
    candidates.into_iter().flatten().collect()
}
