use std::fmt::Write;

use comfy_table::Cell;

use covhub::{CoverageSummary, Metric, ProjectCoverage, ProjectDescriptor};

use super::styling::{bullet, figure, heading, label, toned, Tone};
use super::tables::{color_coded_coverage_cell, create_table, cyan_header};

/// Renders grouped coverage as one table per parent project.
///
/// Columns: project, toolchain, the four canonical metrics and a status.
/// Unset metrics show as "n/a"; failed projects carry their error in the
/// status column.
pub fn render_summary(summary: &CoverageSummary) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");

    let with_metrics = summary
        .projects()
        .filter(|p| p.coverage.is_some())
        .count();
    let failed = summary.projects().filter(|p| p.error.is_some()).count();

    let _ = write!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n\n",
        label("Projects:"),
        figure(summary.total_projects),
        label("Parent projects:"),
        figure(summary.groups.len()),
        label("With coverage:"),
        figure(with_metrics),
        label("Failed:"),
        toned(failed, Tone::for_failures(failed)),
        label("Generated:"),
        label(summary.generated_at.format("%Y-%m-%d %H:%M UTC"))
    );

    for group in &summary.groups {
        add_section_header(&mut output, "📁", &group.parent);

        let mut table = create_table();
        table.set_header(cyan_header(&[
            "Project",
            "Toolchain",
            "Lines",
            "Statements",
            "Branches",
            "Functions",
            "Status",
        ]));

        for record in &group.projects {
            let mut row = vec![
                Cell::new(&record.project.display_name),
                Cell::new(record.project.toolchain().to_string()),
            ];
            row.extend(
                Metric::ALL
                    .iter()
                    .map(|&m| color_coded_coverage_cell(record.coverage.and_then(|c| c.get(m)))),
            );
            row.push(status_cell(record));
            table.add_row(row);
        }

        let _ = writeln!(output, "{table}\n");
    }

    output
}

/// Renders the routing decision for each configured project.
pub fn render_routes(projects: &[ProjectDescriptor]) -> String {
    let mut output = String::new();
    add_section_header(&mut output, "🧭", "Routes");

    let mut table = create_table();
    table.set_header(cyan_header(&[
        "Key",
        "Parent",
        "Toolchain",
        "Format",
        "Report",
    ]));

    for project in projects {
        let toolchain = project.toolchain();
        let format_cell = match toolchain.report_format() {
            Some(format) => Cell::new(format.to_string()).fg(Tone::Good.table_color()),
            None => Cell::new("none").fg(Tone::Muted.table_color()),
        };
        table.add_row(vec![
            Cell::new(project.key()),
            Cell::new(project.parent_label()),
            Cell::new(toolchain.to_string()),
            format_cell,
            Cell::new(&project.report_location),
        ]);
    }

    let _ = writeln!(output, "{table}");
    let _ = write!(
        output,
        "  {} {}",
        bullet(),
        label("Projects without a format are listed without metrics")
    );
    output
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", heading(emoji), heading(title).underlined());
}

fn status_cell(record: &ProjectCoverage) -> Cell {
    match (&record.error, &record.coverage) {
        (Some(error), _) => Cell::new(format!("failed: {error}")).fg(Tone::Poor.table_color()),
        (None, Some(_)) if record.missing.is_empty() => Cell::new("ok").fg(Tone::Good.table_color()),
        (None, Some(_)) => {
            let missing: Vec<String> = record.missing.iter().map(ToString::to_string).collect();
            Cell::new(format!("partial: no {}", missing.join(", "))).fg(Tone::Fair.table_color())
        }
        (None, None) => Cell::new("unsupported").fg(Tone::Muted.table_color()),
    }
}
