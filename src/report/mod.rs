//! Report format parsers.
//!
//! Each parser turns a raw report document into canonical [`CoverageMetrics`].
//! Parsers are permissive: substructure missing from a well-formed document
//! leaves the matching metric unset and is listed in [`ParsedReport::missing`].
//! Only a document that is malformed for its format is an error.

mod jacoco;
mod json_summary;

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::coverage::{CoverageMetrics, Metric, RawTotals};
use crate::error::ParseError;

pub use jacoco::JacocoParser;
pub use json_summary::JsonSummaryParser;

/// Produces canonical metrics from one report format.
pub trait ReportParser {
    fn format(&self) -> ReportFormat;

    /// Parses a raw report document.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` only when the document is not well-formed for
    /// this format.
    fn parse(&self, document: &str) -> Result<ParsedReport, ParseError>;
}

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// istanbul `coverage-summary.json`
    JsonSummary,
    /// JaCoCo `jacoco.xml`
    Jacoco,
}

impl ReportFormat {
    pub fn parser(self) -> &'static dyn ReportParser {
        match self {
            Self::JsonSummary => &JsonSummaryParser,
            Self::Jacoco => &JacocoParser,
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonSummary => f.write_str("json-summary"),
            Self::Jacoco => f.write_str("jacoco-xml"),
        }
    }
}

/// Parser output: metrics plus what could not be found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReport {
    pub metrics: CoverageMetrics,
    pub missing: Vec<Metric>,
    pub totals: Option<RawTotals>,
}

impl ParsedReport {
    /// Stores a metric value, or marks the metric missing when `value` is `None`.
    fn record(&mut self, format: ReportFormat, metric: Metric, value: Option<f64>) {
        if value.is_none() {
            debug!("{format} report does not provide {metric} coverage");
            self.missing.push(metric);
        }
        self.metrics.set(metric, value);
    }
}
