//! Report output model for simulator runs.

use anyhow::Result;
use inertia_scroll::ScrollState;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Report status for a simulator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// One published offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub elapsed_ms: f64,
    pub offset: f64,
}

/// What the engine looked like when the run stopped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalState {
    pub offset: f64,
    pub state: ScrollState,
    pub scroll_events: usize,
    pub scroll_end_events: usize,
}

/// Machine-readable result of a simulator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub status: ReportStatus,
    pub failed_step_index: Option<usize>,
    pub assertion: Option<String>,
    pub message: Option<String>,
    pub elapsed_frames: u64,
    pub elapsed_ms: f64,
    pub final_offset: f64,
    pub final_state: ScrollState,
    pub scroll_events: usize,
    pub scroll_end_events: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<TracePoint>>,
}

impl SimulationReport {
    pub fn passed(elapsed_frames: u64, elapsed_ms: f64, last: FinalState) -> Self {
        Self {
            status: ReportStatus::Passed,
            failed_step_index: None,
            assertion: None,
            message: None,
            elapsed_frames,
            elapsed_ms,
            final_offset: last.offset,
            final_state: last.state,
            scroll_events: last.scroll_events,
            scroll_end_events: last.scroll_end_events,
            trace: None,
        }
    }

    pub fn failed(
        assertion: &str,
        failed_step_index: usize,
        message: String,
        elapsed_frames: u64,
        elapsed_ms: f64,
        last: FinalState,
    ) -> Self {
        Self {
            status: ReportStatus::Failed,
            failed_step_index: Some(failed_step_index),
            assertion: Some(assertion.to_string()),
            message: Some(message),
            ..Self::passed(elapsed_frames, elapsed_ms, last)
        }
    }

    pub fn with_trace(mut self, trace: Vec<TracePoint>) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn is_failed(&self) -> bool {
        self.status == ReportStatus::Failed
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, payload)?;
        Ok(())
    }

    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        let payload = serde_json::to_string_pretty(self)?;
        writer.write_all(payload.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}
