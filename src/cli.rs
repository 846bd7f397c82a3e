use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use covhub::config::{Config, OutputFormat};
use covhub::{CoveragePipeline, CoverageSummary, ReportFetcher};

use crate::output::{self, FetchProgress};

#[derive(Parser)]
#[command(name = "covhub")]
#[command(author, version, about = "Coverage aggregation hub", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./covhub.toml and friends)
    #[arg(short, long, global = true, env = "COVHUB_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every configured report and print the grouped coverage
    Collect {
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        #[arg(short, long, default_value_t = false)]
        pretty: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Per-report fetch deadline in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// Validate the configuration and show how each project is routed
    Check,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let config = Config::load(self.config.as_deref())?;
        config.validate()?;
        Ok(config)
    }

    async fn collect(&self, config: &Config) -> Result<CoverageSummary> {
        let fetcher = ReportFetcher::new(&config.fetch)?;
        let pipeline = CoveragePipeline::new(config.projects.clone(), fetcher)?;

        let progress = FetchProgress::start(pipeline.projects().len());
        let summary = pipeline
            .run_observed(|record| progress.record(record))
            .await;
        progress.finish(&summary);

        Ok(summary)
    }

    async fn execute_collect(
        &self,
        format: Option<OutputFormat>,
        pretty: bool,
        output: Option<&Path>,
        timeout: Option<u64>,
        out: &mut dyn Write,
    ) -> Result<()> {
        let mut config = self
            .load_config()
            .context("Failed to load coverage data")?;
        if let Some(timeout) = timeout {
            config.fetch.timeout_secs = timeout;
            config.validate().context("Failed to load coverage data")?;
        }

        if config.projects.is_empty() {
            writeln!(out, "Projects not found.")?;
            return Ok(());
        }

        let summary = self
            .collect(&config)
            .await
            .context("Failed to load coverage data")?;

        let format = format.unwrap_or(config.output.format);
        let pretty = pretty || config.output.pretty;

        if let Some(output_path) = output {
            let mut file = File::create(output_path)
                .with_context(|| format!("Failed to create {}", output_path.display()))?;
            output::export_summary(&summary, format, pretty, &mut file)?;
            info!("Coverage written to: {}", output_path.display());
        } else {
            output::export_summary(&summary, format, pretty, out)?;
        }

        Ok(())
    }

    fn execute_check(&self, out: &mut dyn Write) -> Result<()> {
        let config = self.load_config()?;

        if config.projects.is_empty() {
            writeln!(out, "Projects not found.")?;
            return Ok(());
        }

        writeln!(out, "{}", output::render_routes(&config.projects))?;
        Ok(())
    }

    /// Runs the selected subcommand, writing results to `out`.
    async fn run(&self, out: &mut dyn Write) -> Result<()> {
        match &self.command {
            Commands::Collect {
                format,
                pretty,
                output,
                timeout,
            } => {
                self.execute_collect(*format, *pretty, output.as_deref(), *timeout, out)
                    .await
            }
            Commands::Check => self.execute_check(out),
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.run(&mut handle).await?;
        handle.flush()?;
        Ok(())
    }
}
