use crate::error::{IncomeLedgerError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Document-format constants for one layout family of the income declaration.
///
/// Every literal the engine matches against lives here, so a layout revision
/// is a profile change rather than a code change.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LayoutProfile {
    #[serde(default)]
    #[schemars(description = "Markers of the index row that anchors column meaning")]
    pub anchor: AnchorMarkers,

    #[serde(default = "default_subtotal_markers")]
    #[schemars(
        description = "Case-insensitive substrings that mark a row printed by the document as a yearly total"
    )]
    pub subtotal_markers: Vec<String>,

    #[serde(default)]
    #[schemars(description = "Header keywords used when a table carries no index row")]
    pub header_keywords: HeaderKeywords,

    #[serde(default = "default_tolerance")]
    #[schemars(
        description = "Absolute difference (document currency units) below which our total and a printed total agree"
    )]
    pub tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct AnchorMarkers {
    #[schemars(description = "Column-0 text of the index row (start of the column numbering)")]
    pub index_start: String,

    #[schemars(description = "Index number printed above the year column")]
    pub year_marker: String,

    #[schemars(description = "Index number printed above the accrued income amount column")]
    pub amount_marker: String,

    #[schemars(description = "Index number printed above the income code and name column")]
    pub code_marker: String,
}

impl Default for AnchorMarkers {
    fn default() -> Self {
        Self {
            index_start: "1".to_string(),
            year_marker: "4".to_string(),
            amount_marker: "7".to_string(),
            code_marker: "13".to_string(),
        }
    }
}

/// Keyword groups for locating columns by their printed header text.
/// A cell matches a group when it contains every keyword of the group.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct HeaderKeywords {
    pub year: Vec<String>,
    pub amount: Vec<String>,
    pub code: Vec<String>,

    #[schemars(description = "How many leading rows of a table are searched for header text")]
    pub scan_rows: usize,
}

impl Default for HeaderKeywords {
    fn default() -> Self {
        Self {
            year: vec!["рік".to_string()],
            amount: vec!["нарахованого".to_string()],
            code: vec!["код".to_string(), "ознаки".to_string()],
            scan_rows: 5,
        }
    }
}

impl HeaderKeywords {
    /// Case-insensitive check that `text` contains every keyword in `group`.
    pub fn matches(group: &[String], text: &str) -> bool {
        if group.is_empty() || text.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        group.iter().all(|k| lowered.contains(&k.to_lowercase()))
    }
}

fn default_subtotal_markers() -> Vec<String> {
    vec!["total".to_string()]
}

fn default_tolerance() -> f64 {
    0.01
}

impl Default for LayoutProfile {
    fn default() -> Self {
        Self {
            anchor: AnchorMarkers::default(),
            subtotal_markers: default_subtotal_markers(),
            header_keywords: HeaderKeywords::default(),
            tolerance: default_tolerance(),
        }
    }
}

impl LayoutProfile {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        let markers = [
            ("index_start", &self.anchor.index_start),
            ("year_marker", &self.anchor.year_marker),
            ("amount_marker", &self.anchor.amount_marker),
            ("code_marker", &self.anchor.code_marker),
        ];

        for (field, value) in markers {
            if value.trim().is_empty() {
                return Err(IncomeLedgerError::InvalidProfile(format!(
                    "anchor.{} must not be empty",
                    field
                )));
            }
        }

        let column_markers: HashSet<&str> = markers[1..].iter().map(|(_, v)| v.trim()).collect();
        if column_markers.len() != 3 {
            return Err(IncomeLedgerError::InvalidProfile(
                "year, amount and code markers must be distinct".to_string(),
            ));
        }

        if self.subtotal_markers.iter().all(|m| m.trim().is_empty()) {
            return Err(IncomeLedgerError::InvalidProfile(
                "at least one subtotal marker is required".to_string(),
            ));
        }

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(IncomeLedgerError::InvalidProfile(format!(
                "tolerance {} must be a non-negative number",
                self.tolerance
            )));
        }

        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(LayoutProfile)
    }
}
