//! Coverage report ingestion and normalization.
//!
//! Fetches istanbul JSON summaries and JaCoCo XML reports, maps them onto one
//! set of canonical percentages and groups the results by parent project.

pub mod config;
pub mod coverage;
pub mod error;
pub mod fetch;
pub mod grouping;
pub mod pipeline;
pub mod report;

pub use config::Config;
pub use coverage::{
    CoverageMetrics, CoverageSummary, Metric, ProjectCoverage, ProjectDescriptor, ProjectGroup,
    Toolchain,
};
pub use error::{CovHubError, FetchError, ParseError, Result};
pub use fetch::ReportFetcher;
pub use pipeline::CoveragePipeline;
