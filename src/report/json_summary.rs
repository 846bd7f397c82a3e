use serde_json::Value;

use super::{ParsedReport, ReportFormat, ReportParser};
use crate::coverage::{Metric, RawTotals};
use crate::error::ParseError;

/// Parser for istanbul/nyc `coverage-summary.json` documents.
///
/// Reads `total.<metric>.pct` for each canonical metric. istanbul writes
/// `"pct": "Unknown"` when a dimension has nothing to measure, so any
/// non-numeric or out-of-range `pct` is treated as not provided.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSummaryParser;

impl ReportParser for JsonSummaryParser {
    fn format(&self) -> ReportFormat {
        ReportFormat::JsonSummary
    }

    fn parse(&self, document: &str) -> Result<ParsedReport, ParseError> {
        let document = document.strip_prefix('\u{feff}').unwrap_or(document);
        let root: Value = serde_json::from_str(document)?;
        let total = root.get("total").filter(|t| t.is_object());

        let mut report = ParsedReport::default();
        for metric in Metric::ALL {
            let pct = total
                .and_then(|t| t.get(metric.summary_key()))
                .and_then(|m| m.get("pct"))
                .and_then(Value::as_f64)
                .filter(|pct| (0.0..=100.0).contains(pct));
            report.record(self.format(), metric, pct);
        }
        report.totals = total.cloned().map(RawTotals::Summary);

        Ok(report)
    }
}
