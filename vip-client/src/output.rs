//! Rendering of ranked scores for the terminal.

use std::fmt::Write;

use clap::ValueEnum;
use vip_common::models::{RankedScore, StageId};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned table with one row per account
    #[default]
    Text,
    /// JSON array of `{"rank", "address", "score"}` objects
    Json,
}

/// Ranked scores of one stage, ready to be printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: StageId,
    pub scores: Vec<RankedScore>,
}

impl StageReport {
    pub fn render(&self, format: OutputFormat) -> Result<String, serde_json::Error> {
        match format {
            OutputFormat::Text => Ok(render_table(self)),
            OutputFormat::Json => serde_json::to_string_pretty(&self.scores),
        }
    }
}

/// Renders all reports. A single stage in JSON is a plain array, several stages are an object
/// keyed by stage.
pub fn render_reports(
    reports: &[StageReport],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match (format, reports) {
        (_, [report]) => report.render(format),
        (OutputFormat::Text, reports) => Ok(reports
            .iter()
            .map(render_table)
            .collect::<Vec<_>>()
            .join("\n")),
        (OutputFormat::Json, reports) => {
            let by_stage: serde_json::Map<String, serde_json::Value> = reports
                .iter()
                .map(|r| serde_json::to_value(&r.scores).map(|v| (r.stage.to_string(), v)))
                .collect::<Result<_, serde_json::Error>>()?;
            serde_json::to_string_pretty(&by_stage)
        }
    }
}

fn render_table(report: &StageReport) -> String {
    let score_width = report
        .scores
        .iter()
        .map(|s| s.score.to_string().len())
        .max()
        .unwrap_or(0)
        .max("SCORE".len());
    let rank_width = report
        .scores
        .len()
        .to_string()
        .len()
        .max("RANK".len());

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "Stage {}: {} accounts", report.stage, report.scores.len());
    let _ = writeln!(out, "{:>rank_width$}  {:<42}  {:>score_width$}", "RANK", "ADDRESS", "SCORE");
    for entry in &report.scores {
        let _ = writeln!(
            out,
            "{:>rank_width$}  {:<42}  {:>score_width$}",
            entry.rank,
            entry.address,
            entry.score.to_string()
        );
    }
    out
}
