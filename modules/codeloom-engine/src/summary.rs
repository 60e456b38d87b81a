//! Per-run summary — a persisted JSON record of what happened to every
//! component, for audit and for the downstream finalize/report step.
//!
//! Each run produces a single `{data_dir}/mapping-runs/{run_id}.json` file
//! with batch stats, one machine-readable report per component, and an
//! ordered event timeline.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use codeloom_common::types::{PropViolation, TerminalStatus};

use crate::runner::BatchStats;

/// One component's machine-readable outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentReport {
    pub component_id: String,
    pub component: String,
    pub status: TerminalStatus,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<PropViolation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_warning: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SummaryRecord {
    seq: u32,
    ts: DateTime<Utc>,
    #[serde(flatten)]
    kind: SummaryEvent,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SummaryEvent {
    ComponentAccepted {
        component: String,
        attempts: u32,
    },
    ComponentExhausted {
        component: String,
        attempts: u32,
        errors: u32,
    },
    ComponentSkipped {
        component: String,
    },
    AttemptRejected {
        component: String,
        attempt: u32,
        errors: u32,
        unparsable: bool,
    },
    ArtifactWritten {
        component: String,
        path: String,
    },
    ImportUnresolved {
        component: String,
        warning: String,
    },
}

pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    events: Vec<SummaryRecord>,
    components: Vec<ComponentReport>,
    seq: u32,
}

impl RunSummary {
    pub fn new(run_id: String) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            events: Vec::new(),
            components: Vec::new(),
            seq: 0,
        }
    }

    pub fn log(&mut self, kind: SummaryEvent) {
        self.events.push(SummaryRecord {
            seq: self.seq,
            ts: Utc::now(),
            kind,
        });
        self.seq += 1;
    }

    pub fn push_report(&mut self, report: ComponentReport) {
        self.components.push(report);
    }

    pub fn reports(&self) -> &[ComponentReport] {
        &self.components
    }

    /// Serialize the summary and write it under `{data_dir}/mapping-runs/`.
    /// Returns the file path on success.
    pub fn save(&self, stats: &BatchStats, data_dir: &Path) -> Result<PathBuf> {
        let dir = data_dir.join("mapping-runs");
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", self.run_id));

        let output = SerializedRunSummary {
            run_id: &self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            stats,
            components: &self.components,
            events: &self.events,
        };
        std::fs::write(&path, serde_json::to_string_pretty(&output)?)?;
        info!(
            path = %path.display(),
            components = self.components.len(),
            events = self.events.len(),
            "run summary saved"
        );
        Ok(path)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializedRunSummary<'a> {
    run_id: &'a str,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    stats: &'a BatchStats,
    components: &'a [ComponentReport],
    events: &'a [SummaryRecord],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_sequenced_in_order() {
        let mut summary = RunSummary::new("run-1".to_string());
        summary.log(SummaryEvent::ComponentSkipped {
            component: "A".to_string(),
        });
        summary.log(SummaryEvent::ComponentAccepted {
            component: "B".to_string(),
            attempts: 1,
        });
        assert_eq!(summary.events[0].seq, 0);
        assert_eq!(summary.events[1].seq, 1);
    }

    #[test]
    fn saved_summaries_round_trip_component_reports() {
        let dir = tempfile::tempdir().unwrap();
        let mut summary = RunSummary::new("run-2".to_string());
        summary.push_report(ComponentReport {
            component_id: "1:1".to_string(),
            component: "Button".to_string(),
            status: TerminalStatus::Accepted,
            attempts: 2,
            errors: vec![],
            output_path: Some(PathBuf::from("connects/Button.figma.tsx")),
            import_warning: None,
        });
        let path = summary.save(&BatchStats::default(), dir.path()).unwrap();

        let raw = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["components"][0]["component"], "Button");
        assert_eq!(value["components"][0]["status"], "accepted");
        assert_eq!(value["components"][0]["attempts"], 2);
    }
}
