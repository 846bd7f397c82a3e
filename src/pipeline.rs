use log::{debug, info, warn};

use crate::coverage::{CoverageSummary, ProjectCoverage, ProjectDescriptor};
use crate::error::Result;
use crate::fetch::ReportFetcher;
use crate::grouping::group_by_parent;

/// Coverage collection pipeline.
///
/// Owns the project list it was constructed with and a fetcher. Each call to
/// [`CoveragePipeline::run`] builds its records from scratch, so repeated runs
/// over unchanged reports produce identical groupings.
pub struct CoveragePipeline {
    projects: Vec<ProjectDescriptor>,
    fetcher: ReportFetcher,
}

impl CoveragePipeline {
    /// Creates a pipeline for the given projects.
    ///
    /// # Errors
    ///
    /// Returns `CovHubError::Config` if any descriptor lacks a display name or
    /// report location.
    pub fn new(projects: Vec<ProjectDescriptor>, fetcher: ReportFetcher) -> Result<Self> {
        projects.iter().try_for_each(ProjectDescriptor::validate)?;
        Ok(Self { projects, fetcher })
    }

    pub fn projects(&self) -> &[ProjectDescriptor] {
        &self.projects
    }

    pub async fn run(&self) -> CoverageSummary {
        self.run_observed(|_| {}).await
    }

    /// Runs the pipeline, calling `on_record` after each project is normalized.
    ///
    /// Projects are processed one at a time in configuration order. A fetch or
    /// parse failure is logged and recorded on that project's record; the run
    /// carries on with the next project.
    pub async fn run_observed<F>(&self, mut on_record: F) -> CoverageSummary
    where
        F: FnMut(&ProjectCoverage),
    {
        info!("Collecting coverage for {} project(s)", self.projects.len());

        let mut records = Vec::with_capacity(self.projects.len());
        for project in &self.projects {
            let record = match normalize(&self.fetcher, project).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("Coverage for {} unavailable: {e}", project.key());
                    ProjectCoverage::failed(project.clone(), &e)
                }
            };
            on_record(&record);
            records.push(record);
        }

        let groups = group_by_parent(records);
        info!("Grouped results into {} parent project(s)", groups.len());

        CoverageSummary::new(groups)
    }
}

/// Normalizes one project: routes it by toolchain, then fetches and parses
/// its report.
///
/// Projects without a normalization route yield a record without metrics;
/// that is not an error.
///
/// # Errors
///
/// Returns `CovHubError::Fetch` or `CovHubError::Parse` when the report cannot
/// be retrieved or is malformed.
pub async fn normalize(
    fetcher: &ReportFetcher,
    project: &ProjectDescriptor,
) -> Result<ProjectCoverage> {
    let toolchain = project.toolchain();
    let Some(format) = toolchain.report_format() else {
        debug!("No coverage route for {} ({toolchain})", project.key());
        return Ok(ProjectCoverage::descriptor_only(project.clone()));
    };

    let document = fetcher.fetch(project).await?;
    let report = format.parser().parse(&document)?;

    if !report.missing.is_empty() {
        debug!(
            "{format} report for {} lacks: {:?}",
            project.key(),
            report.missing
        );
    }

    Ok(ProjectCoverage::from_report(project.clone(), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::coverage::{Metric, ProjectGroup};
    use crate::error::CovHubError;

    const REACT_SUMMARY: &str = r#"{"total": {"lines": {"total": 40, "covered": 37, "skipped": 0, "pct": 92.5}}}"#;

    const SPRING_JACOCO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<report name="backend">
  <counter type="LINE" missed="5" covered="45"/>
</report>"#;

    fn descriptor(
        name: &str,
        parent: Option<&str>,
        language: &str,
        framework: &str,
        location: String,
    ) -> ProjectDescriptor {
        ProjectDescriptor {
            id: Some(format!("{name}-id")),
            parent_project: parent.map(str::to_owned),
            language: Some(language.to_string()),
            framework: Some(framework.to_string()),
            display_name: name.to_string(),
            report_location: location,
        }
    }

    fn pipeline(projects: Vec<ProjectDescriptor>) -> CoveragePipeline {
        let fetcher = ReportFetcher::new(&FetchConfig::default()).unwrap();
        CoveragePipeline::new(projects, fetcher).unwrap()
    }

    fn coverage_lines(group: &ProjectGroup) -> Vec<Option<f64>> {
        group
            .projects
            .iter()
            .map(|p| p.coverage.and_then(|c| c.lines))
            .collect()
    }

    #[tokio::test]
    async fn test_react_and_spring_in_one_group() {
        // Arrange
        let mut server = mockito::Server::new_async().await;
        let _react = server
            .mock("GET", "/react/coverage-summary.json")
            .with_status(200)
            .with_body(REACT_SUMMARY)
            .create_async()
            .await;
        let _spring = server
            .mock("GET", "/spring/jacoco.xml")
            .with_status(200)
            .with_body(SPRING_JACOCO)
            .create_async()
            .await;

        let projects = vec![
            descriptor(
                "frontend",
                Some("X"),
                "javascript",
                "react",
                format!("{}/react/coverage-summary.json", server.url()),
            ),
            descriptor(
                "backend",
                Some("X"),
                "java",
                "spring",
                format!("{}/spring/jacoco.xml", server.url()),
            ),
        ];

        // Act
        let summary = pipeline(projects).run().await;

        // Assert
        assert_eq!(summary.groups.len(), 1);
        assert_eq!(summary.total_projects, 2);

        let group = &summary.groups[0];
        assert_eq!(group.parent, "X");
        assert_eq!(coverage_lines(group), vec![Some(92.5), Some(90.0)]);

        let frontend = group.projects[0].coverage.unwrap();
        assert_eq!(frontend.statements, None);
        assert_eq!(frontend.branches, None);
        assert_eq!(frontend.functions, None);
        assert_eq!(
            group.projects[0].missing,
            vec![Metric::Statements, Metric::Branches, Metric::Functions]
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_degrades_single_project() {
        let mut server = mockito::Server::new_async().await;
        let _react = server
            .mock("GET", "/react/coverage-summary.json")
            .with_status(200)
            .with_body(REACT_SUMMARY)
            .create_async()
            .await;
        let _spring = server
            .mock("GET", "/spring/jacoco.xml")
            .with_status(503)
            .create_async()
            .await;

        let projects = vec![
            descriptor(
                "frontend",
                Some("X"),
                "javascript",
                "react",
                format!("{}/react/coverage-summary.json", server.url()),
            ),
            descriptor(
                "backend",
                Some("X"),
                "java",
                "spring",
                format!("{}/spring/jacoco.xml", server.url()),
            ),
        ];

        let summary = pipeline(projects).run().await;

        let group = &summary.groups[0];
        assert_eq!(group.parent, "X");
        assert_eq!(group.projects.len(), 2);
        assert_eq!(group.projects[0].coverage.and_then(|c| c.lines), Some(92.5));
        assert!(group.projects[1].coverage.is_none());

        let error = group.projects[1].error.as_deref().unwrap();
        assert!(error.contains("backend-id"));
        assert!(error.contains("503"));
    }

    #[tokio::test]
    async fn test_malformed_report_degrades_single_project() {
        let mut server = mockito::Server::new_async().await;
        let _spring = server
            .mock("GET", "/spring/jacoco.xml")
            .with_status(200)
            .with_body("<report><counter type=\"LINE\"")
            .create_async()
            .await;

        let projects = vec![descriptor(
            "backend",
            None,
            "java",
            "spring",
            format!("{}/spring/jacoco.xml", server.url()),
        )];

        let summary = pipeline(projects).run().await;

        let record = &summary.groups[0].projects[0];
        assert!(record.coverage.is_none());
        assert!(record.error.as_deref().unwrap().contains("JaCoCo"));
    }

    #[tokio::test]
    async fn test_unsupported_toolchain_is_not_fetched() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let project = descriptor(
            "ml",
            Some("Data"),
            "python",
            "django",
            format!("{}/coverage.xml", server.url()),
        );
        let fetcher = ReportFetcher::new(&FetchConfig::default()).unwrap();

        let record = normalize(&fetcher, &project).await.unwrap();

        assert!(record.coverage.is_none());
        assert!(record.error.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_normalize_surfaces_fetch_error() {
        let project = descriptor(
            "backend",
            None,
            "java",
            "spring",
            "missing/dir/jacoco.xml".to_string(),
        );
        let fetcher = ReportFetcher::new(&FetchConfig::default()).unwrap();

        let err = normalize(&fetcher, &project).await.unwrap_err();
        assert!(matches!(err, CovHubError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_runs_are_idempotent() {
        let mut server = mockito::Server::new_async().await;
        let _react = server
            .mock("GET", "/react/coverage-summary.json")
            .with_status(200)
            .with_body(REACT_SUMMARY)
            .expect(2)
            .create_async()
            .await;

        let projects = vec![
            descriptor(
                "frontend",
                Some("B"),
                "javascript",
                "react",
                format!("{}/react/coverage-summary.json", server.url()),
            ),
            descriptor("legacy", None, "javascript", "angular", "legacy.json".to_string()),
        ];
        let pipeline = pipeline(projects);

        let first = pipeline.run().await;
        let second = pipeline.run().await;

        assert_eq!(first.groups, second.groups);
        assert_eq!(first.total_projects, second.total_projects);
    }

    #[tokio::test]
    async fn test_groups_sorted_with_configuration_order() {
        let projects = vec![
            descriptor("z1", Some("Zeta"), "go", "gin", "z1.json".to_string()),
            descriptor("u1", None, "go", "gin", "u1.json".to_string()),
            descriptor("a1", Some("Alpha"), "go", "gin", "a1.json".to_string()),
            descriptor("z2", Some("Zeta"), "go", "gin", "z2.json".to_string()),
        ];

        let mut observed = Vec::new();
        let summary = pipeline(projects)
            .run_observed(|record| observed.push(record.project.display_name.clone()))
            .await;

        assert_eq!(observed, vec!["z1", "u1", "a1", "z2"]);

        let labels: Vec<&str> = summary.groups.iter().map(|g| g.parent.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "Ungrouped", "Zeta"]);

        let zeta: Vec<&str> = summary.groups[2]
            .projects
            .iter()
            .map(|p| p.project.display_name.as_str())
            .collect();
        assert_eq!(zeta, vec!["z1", "z2"]);
    }

    #[test]
    fn test_new_rejects_invalid_descriptor() {
        let fetcher = ReportFetcher::new(&FetchConfig::default()).unwrap();
        let projects = vec![descriptor("", None, "java", "spring", "jacoco.xml".to_string())];

        let result = CoveragePipeline::new(projects, fetcher);
        assert!(matches!(result, Err(CovHubError::Config(_))));
    }
}
