use indexmap::IndexMap;
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{ParsedReport, ReportFormat, ReportParser};
use crate::coverage::{CounterTotals, Metric, RawTotals};
use crate::error::ParseError;

/// Parser for JaCoCo XML reports.
///
/// Only `<counter>` elements that are direct children of the root `<report>`
/// element are read; package, class and method counters nested deeper are
/// ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct JacocoParser;

impl ReportParser for JacocoParser {
    fn format(&self) -> ReportFormat {
        ReportFormat::Jacoco
    }

    fn parse(&self, document: &str) -> Result<ParsedReport, ParseError> {
        let counters = read_report_counters(document)?;

        let mut report = ParsedReport::default();
        for metric in Metric::ALL {
            let pct = counters
                .get(metric.jacoco_counter())
                .and_then(CounterTotals::percentage);
            report.record(self.format(), metric, pct);
        }
        if !counters.is_empty() {
            report.totals = Some(RawTotals::Counters(counters));
        }

        Ok(report)
    }
}

/// Collects report-level counters keyed by type, checking well-formedness on
/// the way. The first counter of each type wins.
fn read_report_counters(document: &str) -> Result<IndexMap<String, CounterTotals>, ParseError> {
    let mut reader = Reader::from_str(document);
    reader.trim_text(true);

    let mut counters = IndexMap::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if depth == 0 {
                    open_root(&mut seen_root)?;
                } else if depth == 1 && e.name().as_ref() == b"counter" {
                    record_counter(e, &mut counters);
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 0 {
                    open_root(&mut seen_root)?;
                } else if depth == 1 && e.name().as_ref() == b"counter" {
                    record_counter(e, &mut counters);
                }
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(_)) | Ok(Event::CData(_)) if depth == 0 => {
                return Err(ParseError::Xml(format!(
                    "content outside the root element at position {}",
                    reader.buffer_position()
                )));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ParseError::Xml(format!(
                    "error at position {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(ParseError::Xml("document has no root element".to_string()));
    }
    if depth > 0 {
        return Err(ParseError::Xml(format!(
            "unexpected end of document with {depth} unclosed element(s)"
        )));
    }

    Ok(counters)
}

fn open_root(seen_root: &mut bool) -> Result<(), ParseError> {
    if *seen_root {
        return Err(ParseError::Xml(
            "document has more than one root element".to_string(),
        ));
    }
    *seen_root = true;
    Ok(())
}

fn record_counter(element: &BytesStart<'_>, counters: &mut IndexMap<String, CounterTotals>) {
    let mut kind = None;
    let mut covered = None;
    let mut missed = None;

    for attr in element.attributes().filter_map(|a| a.ok()) {
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"type" => kind = Some(value.trim().to_string()),
            b"covered" => covered = value.trim().parse::<u64>().ok(),
            b"missed" => missed = value.trim().parse::<u64>().ok(),
            _ => {}
        }
    }

    match (kind, covered, missed) {
        (Some(kind), Some(covered), Some(missed)) => {
            counters
                .entry(kind)
                .or_insert(CounterTotals { covered, missed });
        }
        (kind, _, _) => {
            debug!(
                "Skipping JaCoCo counter {} without numeric covered/missed attributes",
                kind.as_deref().unwrap_or("<untyped>")
            );
        }
    }
}
