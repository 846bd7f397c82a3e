use anyhow::Result;
use std::io::Write;

use covhub::config::OutputFormat;
use covhub::{CoverageSummary, Metric};

use super::summary::render_summary;

/// Writes the grouped coverage in the requested format.
///
/// - Summary: human-readable tables
/// - JSON: the full `CoverageSummary`, including raw totals
/// - CSV: one row per project, in group order
pub fn export_summary(
    summary: &CoverageSummary,
    format: OutputFormat,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Summary => {
            writeln!(output, "{}", render_summary(summary))?;
            Ok(())
        }
        OutputFormat::Json => export_json(summary, pretty, output),
        OutputFormat::Csv => export_csv(summary, output),
    }
}

fn export_json(summary: &CoverageSummary, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(summary)?
    } else {
        serde_json::to_string(summary)?
    };
    writeln!(output, "{}", json)?;
    Ok(())
}

fn export_csv(summary: &CoverageSummary, output: &mut dyn Write) -> Result<()> {
    writeln!(
        output,
        "Parent Project,Key,Display Name,Language,Framework,Lines,Statements,Branches,Functions,Error"
    )?;

    for group in &summary.groups {
        for record in &group.projects {
            let project = &record.project;
            let metrics: Vec<String> = Metric::ALL
                .iter()
                .map(|&m| {
                    record
                        .coverage
                        .and_then(|c| c.get(m))
                        .map(|pct| format!("{pct:.2}"))
                        .unwrap_or_default()
                })
                .collect();

            writeln!(
                output,
                "{},{},{},{},{},{},{}",
                csv_field(&group.parent),
                csv_field(project.key()),
                csv_field(&project.display_name),
                csv_field(project.language.as_deref().unwrap_or("")),
                csv_field(project.framework.as_deref().unwrap_or("")),
                metrics.join(","),
                csv_field(record.error.as_deref().unwrap_or(""))
            )?;
        }
    }

    Ok(())
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use covhub::{CoverageMetrics, ProjectCoverage, ProjectDescriptor, ProjectGroup};

    fn create_test_summary() -> CoverageSummary {
        let mut web = ProjectCoverage::descriptor_only(ProjectDescriptor {
            id: Some("1".to_string()),
            parent_project: Some("CRDC".to_string()),
            language: Some("javascript".to_string()),
            framework: Some("react".to_string()),
            display_name: "Bento \"ICDC\" Frontend".to_string(),
            report_location: "https://example.com/coverage-summary.json".to_string(),
        });
        web.coverage = Some(CoverageMetrics {
            lines: Some(92.5),
            ..Default::default()
        });

        let mut api = ProjectCoverage::descriptor_only(ProjectDescriptor {
            id: None,
            parent_project: None,
            language: Some("java".to_string()),
            framework: Some("spring".to_string()),
            display_name: "api".to_string(),
            report_location: "https://example.com/jacoco.xml".to_string(),
        });
        api.error = Some("Report fetch failed for api: HTTP 404".to_string());

        CoverageSummary::new(vec![
            ProjectGroup {
                parent: "CRDC".to_string(),
                projects: vec![web],
            },
            ProjectGroup {
                parent: "Ungrouped".to_string(),
                projects: vec![api],
            },
        ])
    }

    #[test]
    fn test_export_json() {
        let summary = create_test_summary();
        let mut output = Vec::new();
        export_json(&summary, false, &mut output).unwrap();
        let json_str = String::from_utf8(output).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json_str).unwrap();
        assert_eq!(value["total_projects"], 2);
        assert_eq!(value["groups"][0]["parent"], "CRDC");
        assert_eq!(value["groups"][0]["projects"][0]["coverage"]["lines"], 92.5);
        assert!(value["groups"][0]["projects"][0]["coverage"]["branches"].is_null());
        assert!(value["groups"][1]["projects"][0]["coverage"].is_null());
    }

    #[test]
    fn test_export_json_pretty() {
        let summary = create_test_summary();
        let mut output = Vec::new();
        export_json(&summary, true, &mut output).unwrap();
        let json_str = String::from_utf8(output).unwrap();
        assert!(json_str.contains('\n'));
        assert!(json_str.contains("  "));
    }

    #[test]
    fn test_export_csv() {
        let summary = create_test_summary();
        let mut output = Vec::new();
        export_csv(&summary, &mut output).unwrap();
        let csv = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Parent Project,Key"));
        assert_eq!(
            lines[1],
            "\"CRDC\",\"1\",\"Bento \"\"ICDC\"\" Frontend\",\"javascript\",\"react\",92.50,,,,\"\""
        );
        assert!(lines[2].starts_with("\"Ungrouped\",\"api\""));
        assert!(lines[2].ends_with("\"Report fetch failed for api: HTTP 404\""));
    }

    #[test]
    fn test_export_summary_dispatches_format() {
        let summary = create_test_summary();
        let mut output = Vec::new();
        export_summary(&summary, OutputFormat::Summary, false, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Overview"));
    }
}
