use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CovHubError, Result};
use crate::report::{ParsedReport, ReportFormat};

/// Group label used for projects that declare no parent project.
pub const UNGROUPED: &str = "Ungrouped";

/// One coverage-producing unit as declared in the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectDescriptor {
    /// Opaque identifier, not required to be unique
    #[serde(default)]
    pub id: Option<String>,
    /// Grouping key for display sections
    #[serde(default)]
    pub parent_project: Option<String>,
    /// Source language (e.g. "javascript", "java")
    #[serde(default)]
    pub language: Option<String>,
    /// Framework within the language (e.g. "react", "spring")
    #[serde(default)]
    pub framework: Option<String>,
    /// Human-readable project name
    pub display_name: String,
    /// URL or filesystem path of the report document
    pub report_location: String,
}

impl ProjectDescriptor {
    /// Identity used for list rendering and log messages: the `id` when set,
    /// otherwise the display name.
    pub fn key(&self) -> &str {
        non_blank(self.id.as_deref()).unwrap_or(&self.display_name)
    }

    /// Parent group label, falling back to [`UNGROUPED`] for absent or blank values.
    pub fn parent_label(&self) -> &str {
        non_blank(self.parent_project.as_deref()).unwrap_or(UNGROUPED)
    }

    pub fn toolchain(&self) -> Toolchain {
        Toolchain::from_parts(self.language.as_deref(), self.framework.as_deref())
    }

    /// Checks the fields every descriptor must carry.
    ///
    /// # Errors
    ///
    /// Returns `CovHubError::Config` if `display-name` or `report-location` is blank.
    pub fn validate(&self) -> Result<()> {
        if self.display_name.trim().is_empty() {
            return Err(CovHubError::Config(format!(
                "project '{}' has an empty display-name",
                self.id.as_deref().unwrap_or("<no id>")
            )));
        }
        if self.report_location.trim().is_empty() {
            return Err(CovHubError::Config(format!(
                "project '{}' has an empty report-location",
                self.key()
            )));
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// The language/framework pair a project builds with.
///
/// Every pair the configuration may contain maps onto exactly one variant, so
/// routing a project to a report format is an exhaustive match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toolchain {
    /// React on JavaScript, reporting through an istanbul JSON summary
    ReactJavaScript,
    /// Spring on Java, reporting through JaCoCo XML
    SpringJava,
    /// Any pair without a normalization route
    Unsupported {
        language: Option<String>,
        framework: Option<String>,
    },
}

impl Toolchain {
    /// Classifies a language/framework pair. Comparison is ASCII
    /// case-insensitive on trimmed values.
    pub fn from_parts(language: Option<&str>, framework: Option<&str>) -> Self {
        let normalized = |v: Option<&str>| v.map(|s| s.trim().to_ascii_lowercase());

        match (
            normalized(language).as_deref(),
            normalized(framework).as_deref(),
        ) {
            (Some("javascript"), Some("react")) => Self::ReactJavaScript,
            (Some("java"), Some("spring")) => Self::SpringJava,
            _ => Self::Unsupported {
                language: language.map(str::to_owned),
                framework: framework.map(str::to_owned),
            },
        }
    }

    /// The report format to normalize from, or `None` for ineligible pairs.
    pub fn report_format(&self) -> Option<ReportFormat> {
        match self {
            Self::ReactJavaScript => Some(ReportFormat::JsonSummary),
            Self::SpringJava => Some(ReportFormat::Jacoco),
            Self::Unsupported { .. } => None,
        }
    }
}

impl fmt::Display for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReactJavaScript => f.write_str("javascript/react"),
            Self::SpringJava => f.write_str("java/spring"),
            Self::Unsupported {
                language,
                framework,
            } => write!(
                f,
                "{}/{} (unsupported)",
                language.as_deref().unwrap_or("?"),
                framework.as_deref().unwrap_or("?")
            ),
        }
    }
}

/// One of the four canonical coverage dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Lines,
    Statements,
    Branches,
    Functions,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Lines,
        Metric::Statements,
        Metric::Branches,
        Metric::Functions,
    ];

    /// Key under `total` in an istanbul JSON summary.
    pub fn summary_key(self) -> &'static str {
        match self {
            Self::Lines => "lines",
            Self::Statements => "statements",
            Self::Branches => "branches",
            Self::Functions => "functions",
        }
    }

    /// JaCoCo counter type carrying the equivalent measurement.
    pub fn jacoco_counter(self) -> &'static str {
        match self {
            Self::Lines => "LINE",
            Self::Statements => "INSTRUCTION",
            Self::Branches => "BRANCH",
            Self::Functions => "METHOD",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.summary_key())
    }
}

/// Canonical coverage percentages. Each field is in `[0, 100]` when set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageMetrics {
    pub lines: Option<f64>,
    pub statements: Option<f64>,
    pub branches: Option<f64>,
    pub functions: Option<f64>,
}

impl CoverageMetrics {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Lines => self.lines,
            Metric::Statements => self.statements,
            Metric::Branches => self.branches,
            Metric::Functions => self.functions,
        }
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        let slot = match metric {
            Metric::Lines => &mut self.lines,
            Metric::Statements => &mut self.statements,
            Metric::Branches => &mut self.branches,
            Metric::Functions => &mut self.functions,
        };
        *slot = value;
    }
}

/// Covered/missed pair from a JaCoCo counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterTotals {
    pub covered: u64,
    pub missed: u64,
}

impl CounterTotals {
    /// Covered share as a percentage; `None` when the counter is empty.
    pub fn percentage(&self) -> Option<f64> {
        let total = self.covered.checked_add(self.missed)?;
        if total == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let pct = self.covered as f64 * 100.0 / total as f64;
        Some(pct)
    }
}

/// Format-specific aggregate data passed through alongside the canonical metrics.
///
/// Untagged: `Counters` is tried first because `Summary` accepts any value.
/// istanbul entries carry no `missed` field, so they never read as counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTotals {
    /// Report-level JaCoCo counters keyed by type, in document order
    Counters(IndexMap<String, CounterTotals>),
    /// The `total` object of a JSON summary, as found
    Summary(serde_json::Value),
}

/// Normalization result for a single project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectCoverage {
    pub project: ProjectDescriptor,
    /// Absent for unsupported toolchains and failed fetches or parses
    pub coverage: Option<CoverageMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<RawTotals>,
    /// Canonical fields the report did not provide
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<Metric>,
    /// Fetch or parse failure recorded by the pipeline driver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProjectCoverage {
    /// Record for a project without a normalization route.
    pub fn descriptor_only(project: ProjectDescriptor) -> Self {
        Self {
            project,
            coverage: None,
            totals: None,
            missing: Vec::new(),
            error: None,
        }
    }

    pub fn from_report(project: ProjectDescriptor, report: ParsedReport) -> Self {
        Self {
            project,
            coverage: Some(report.metrics),
            totals: report.totals,
            missing: report.missing,
            error: None,
        }
    }

    /// Record for a project whose report could not be fetched or parsed.
    pub fn failed(project: ProjectDescriptor, error: &CovHubError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::descriptor_only(project)
        }
    }
}

/// Projects sharing a parent label, in configuration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectGroup {
    pub parent: String,
    pub projects: Vec<ProjectCoverage>,
}

/// Output of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub generated_at: DateTime<Utc>,
    pub total_projects: usize,
    /// Groups sorted by parent label
    pub groups: Vec<ProjectGroup>,
}

impl CoverageSummary {
    pub fn new(groups: Vec<ProjectGroup>) -> Self {
        Self {
            generated_at: Utc::now(),
            total_projects: groups.iter().map(|g| g.projects.len()).sum(),
            groups,
        }
    }

    pub fn projects(&self) -> impl Iterator<Item = &ProjectCoverage> {
        self.groups.iter().flat_map(|g| &g.projects)
    }
}
