use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use covhub::{CoverageSummary, ProjectCoverage};

use super::styling::{heading, toned, Tone};

/// Progress tracking while reports are fetched one by one
pub struct FetchProgress {
    pb: ProgressBar,
}

impl FetchProgress {
    pub fn start(total: usize) -> Self {
        eprintln!("{}  {}", heading("⚙️"), heading("Reports").underlined());
        let pb = ProgressBar::new(total as u64);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("  {msg} [{pos}/{len}] {spinner}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(toned("Fetching coverage reports", Tone::Fair).to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn record(&self, record: &ProjectCoverage) {
        if record.error.is_some() {
            self.pb.println(format!(
                "  {} {}",
                toned("✗", Tone::Poor),
                toned(record.project.key(), Tone::Poor)
            ));
        }
        self.pb
            .set_message(toned(format!("Fetched {}", record.project.key()), Tone::Fair).to_string());
        self.pb.inc(1);
    }

    pub fn finish(self, summary: &CoverageSummary) {
        self.pb.finish_with_message(
            toned(
                format!(
                    "Collected {} project(s) in {} group(s) ✓",
                    summary.total_projects,
                    summary.groups.len()
                ),
                Tone::Good,
            )
            .to_string(),
        );
        eprintln!();
    }
}
