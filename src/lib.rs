//! # Income Ledger Builder
//!
//! Turns the layout-analysis output of a document-understanding service for a
//! multi-page income declaration into a verified ledger of declared income,
//! broken down by fiscal year and income-category code.
//!
//! ## Core Concepts
//!
//! - **Fragment**: one table as delivered by the analysis service. A logical table is often
//!   split across pages into several fragments.
//! - **Anchor row**: the printed row of column numbers ("1", "2", ...) above the data. The
//!   numbers over the year, amount and code columns fix which column holds what.
//! - **Subtotal row**: a yearly total printed by the document itself, used to verify our sums.
//! - **Ledger**: per year, code → `{name, amount}` plus a `_total`.
//!
//! Every call is a pure function of its input: no I/O, no shared state.
//!
//! ## Example
//!
//! ```rust,ignore
//! use income_ledger_builder::IncomeStatementParser;
//!
//! let raw = std::fs::read_to_string("analysis.json")?;
//! let outcome = IncomeStatementParser::new().parse_json(&raw);
//!
//! if outcome.success {
//!     let summary = outcome.summary.as_ref().unwrap();
//!     println!("{} years, {} total", summary.total_years, summary.total_amount);
//! }
//! ```

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod grid;
pub mod header;
pub mod layout;
pub mod reconciler;
pub mod schema;
pub mod stitcher;
pub mod strategy;
pub mod summary;
pub mod utils;

pub use aggregator::{aggregate, CodeEntry, Ledger, YearLedger};
pub use classifier::{
    ClassifiedRow, IncomeRecord, MarkerPredicate, RowClassifier, RowPredicate, SubtotalClaim,
};
pub use error::{IncomeLedgerError, Result};
pub use grid::Grid;
pub use header::{locate_anchor, Anchor, ColumnMap};
pub use layout::{AnchorMarkers, HeaderKeywords, LayoutProfile};
pub use reconciler::{ReconciliationReport, Reconciler, YearMatch, YearMismatch};
pub use schema::*;
pub use stitcher::{LogicalRow, Stitcher};
pub use strategy::{
    default_strategies, Extraction, ExtractionStrategy, KeywordHeaderTables, RawText,
    StitchedTables,
};
pub use summary::Summary;

use log::{error, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The structure handed to whoever writes results back or renders them.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ParseOutcome {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Ledger>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<ReconciliationReport>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ParseOutcome {
    pub fn failure(err: &IncomeLedgerError) -> Self {
        Self {
            success: false,
            data: None,
            summary: None,
            verification: None,
            error: Some(err.to_string()),
        }
    }

    /// Pretty JSON with non-ASCII text kept as-is.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ParseOutcome)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

pub struct IncomeStatementParser {
    profile: LayoutProfile,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for IncomeStatementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl IncomeStatementParser {
    pub fn new() -> Self {
        Self {
            profile: LayoutProfile::default(),
            strategies: default_strategies(),
        }
    }

    pub fn with_profile(profile: LayoutProfile) -> Result<Self> {
        profile.validate()?;
        Ok(Self {
            profile,
            strategies: default_strategies(),
        })
    }

    /// Replaces the strategy list. Strategies are tried in the given order.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn profile(&self) -> &LayoutProfile {
        &self.profile
    }

    pub fn parse_json(&self, raw: &str) -> ParseOutcome {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => self.parse_value(&value),
            Err(e) => Self::fail(IncomeLedgerError::InvalidPayload(e)),
        }
    }

    /// Parses a full service response (`{"analyzeResult": {...}}`).
    pub fn parse_value(&self, value: &serde_json::Value) -> ParseOutcome {
        match validate_payload(value) {
            Ok(result) => self.parse_result(&result),
            Err(e) => Self::fail(e),
        }
    }

    pub fn parse_result(&self, result: &AnalyzeResult) -> ParseOutcome {
        self.parse_document(&Document::from(result))
    }

    pub fn parse_document(&self, document: &Document) -> ParseOutcome {
        info!("Parsing document with {} tables", document.tables.len());

        match self.build(document) {
            Ok(outcome) => outcome,
            Err(e) => Self::fail(e),
        }
    }

    fn fail(err: IncomeLedgerError) -> ParseOutcome {
        error!("Parsing failed: {}", err);
        ParseOutcome::failure(&err)
    }

    fn build(&self, document: &Document) -> Result<ParseOutcome> {
        let extraction = self.extract(document)?;

        let ledger = aggregate(&extraction.records);
        let summary = Summary::from_ledger(&ledger);

        let verification = if extraction.subtotals.is_empty() {
            None
        } else {
            Some(Reconciler::new(self.profile.tolerance).reconcile(&ledger, &extraction.subtotals))
        };

        info!(
            "Parsing completed successfully. Found {} years",
            summary.total_years
        );

        Ok(ParseOutcome {
            success: true,
            data: Some(ledger),
            summary: Some(summary),
            verification,
            error: None,
        })
    }

    fn extract(&self, document: &Document) -> Result<Extraction> {
        let mut first: Option<Extraction> = None;

        for strategy in &self.strategies {
            let extraction = strategy.extract(document, &self.profile)?;

            if !extraction.records.is_empty() {
                info!(
                    "Strategy '{}' extracted {} records",
                    strategy.name(),
                    extraction.records.len()
                );
                return Ok(extraction);
            }

            warn!("Strategy '{}' extracted no records", strategy.name());
            first.get_or_insert(extraction);
        }

        Ok(first.unwrap_or_default())
    }
}

fn validate_payload(value: &serde_json::Value) -> Result<AnalyzeResult> {
    let analyze_result = value
        .get("analyzeResult")
        .filter(|v| !v.is_null())
        .ok_or_else(|| IncomeLedgerError::MissingPayload("analyzeResult".to_string()))?;

    if analyze_result.get("content").is_none() {
        return Err(IncomeLedgerError::MissingPayload("content".to_string()));
    }

    Ok(AnalyzeResult::deserialize(analyze_result)?)
}
