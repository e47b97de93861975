use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use framelen_adjust::{AdjustedFrame, FrameStatus, SweepReport};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    index: usize,
    #[serde(flatten)]
    status: &'a FrameStatus,
    user: bool,
    output: String,
}

pub fn print_adjusted(frames: &[AdjustedFrame], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for (index, adjusted) in frames.iter().enumerate() {
                let out = FrameOutput {
                    index,
                    status: &adjusted.status,
                    user: adjusted.frame.user,
                    output: to_hex(&adjusted.frame.data),
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "FRAME", "IN", "OUT", "PAD", "TRUNCATE", "USER", "OUTPUT",
                ]);
            for (index, adjusted) in frames.iter().enumerate() {
                let status = &adjusted.status;
                table.add_row(vec![
                    index.to_string(),
                    status.original_length.to_string(),
                    status.output_length.to_string(),
                    status.pad.to_string(),
                    status.truncate.to_string(),
                    adjusted.frame.user.to_string(),
                    to_hex(&adjusted.frame.data),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (index, adjusted) in frames.iter().enumerate() {
                let status = &adjusted.status;
                println!(
                    "frame={} in={} out={} pad={} truncate={} user={} data={}",
                    index,
                    status.original_length,
                    status.output_length,
                    status.pad,
                    status.truncate,
                    adjusted.frame.user,
                    to_hex(&adjusted.frame.data)
                );
            }
        }
    }
}

pub fn print_sweep(report: &SweepReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut summary = Table::new();
            summary
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["LANES", "CASES", "FRAMES", "CYCLES", "FAILURES"])
                .add_row(vec![
                    report.lanes.to_string(),
                    report.cases.to_string(),
                    report.frames.to_string(),
                    report.cycles.to_string(),
                    report.failures.len().to_string(),
                ]);
            println!("{summary}");

            if !report.failures.is_empty() {
                let mut failures = Table::new();
                failures
                    .load_preset(UTF8_FULL)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(vec!["MIN", "MAX", "PAYLOAD", "SCENARIO", "REGIME", "ERROR"]);
                for case in &report.failures {
                    failures.add_row(vec![
                        case.length_min.to_string(),
                        case.length_max.to_string(),
                        case.payload.to_string(),
                        case.scenario.to_string(),
                        case.regime.clone(),
                        case.message.clone(),
                    ]);
                }
                println!("{failures}");
            }
        }
        OutputFormat::Pretty => {
            println!(
                "lanes={} cases={} frames={} cycles={} failures={}",
                report.lanes,
                report.cases,
                report.frames,
                report.cycles,
                report.failures.len()
            );
            for case in &report.failures {
                println!(
                    "  FAIL min={} max={} payload={} scenario={} regime={}: {}",
                    case.length_min,
                    case.length_max,
                    case.payload,
                    case.scenario,
                    case.regime,
                    case.message
                );
            }
        }
    }
}

/// Lowercase hex without separators.
pub fn to_hex(data: &[u8]) -> String {
    hex::encode(data)
}
