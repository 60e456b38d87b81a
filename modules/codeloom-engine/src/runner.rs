//! Batch runner: a bounded worker pool drives every component run to a
//! terminal state, then a sequential write phase lands artifacts and the
//! run summary. One component's failure never aborts the batch.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use codeloom_common::config::{clamp_retries, Config};
use codeloom_common::error::CodeloomError;
use codeloom_common::heuristics::Heuristics;
use codeloom_common::types::{ComponentEvidence, ComponentRun, TerminalStatus};
use codeloom_mapper::imports::ImportResolver;
use codeloom_mapper::renderer::TargetStyle;
use codeloom_mapper::surface::PropSurface;
use proposer_client::traits::{ProposalContext, ProposalSource};

use crate::artifacts::{ArtifactWriter, FileArena};
use crate::orchestrator::Orchestrator;
use crate::summary::{ComponentReport, RunSummary, SummaryEvent};

const DEFAULT_CONCURRENCY: usize = 5;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub output_dir: PathBuf,
    pub data_dir: PathBuf,
    pub max_retries: u32,
    pub concurrency: usize,
    pub style: TargetStyle,
    /// Project root probed during import resolution; `None` disables probing.
    pub project_root: Option<PathBuf>,
}

impl EngineConfig {
    pub fn new(output_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            data_dir: data_dir.into(),
            max_retries: 2,
            concurrency: DEFAULT_CONCURRENCY,
            style: TargetStyle::default(),
            project_root: None,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = clamp_retries(max_retries);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_style(mut self, style: TargetStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }
}

impl TryFrom<&Config> for EngineConfig {
    type Error = CodeloomError;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        Ok(Self {
            output_dir: config.output_dir.clone(),
            data_dir: config.data_dir.clone(),
            max_retries: clamp_retries(config.max_retries),
            concurrency: config.concurrency.max(1),
            style: config.target_style.parse()?,
            project_root: None,
        })
    }
}

/// One unit of work: evidence plus the context its proposals need.
pub struct ComponentJob {
    pub context: ProposalContext,
    pub evidence: ComponentEvidence,
    pub surface: Option<PropSurface>,
}

/// Stats from one mapping run.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub components: u32,
    pub accepted: u32,
    pub exhausted: u32,
    pub skipped: u32,
    pub attempts: u32,
    pub files_written: u32,
    pub import_warnings: u32,
}

impl std::fmt::Display for BatchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Mapping Run Complete ===")?;
        writeln!(f, "Components:      {}", self.components)?;
        writeln!(f, "Accepted:        {}", self.accepted)?;
        writeln!(f, "Exhausted:       {}", self.exhausted)?;
        writeln!(f, "Skipped:         {}", self.skipped)?;
        writeln!(f, "Attempts:        {}", self.attempts)?;
        writeln!(f, "Files written:   {}", self.files_written)?;
        writeln!(f, "Import warnings: {}", self.import_warnings)?;
        Ok(())
    }
}

pub struct BatchOutcome {
    pub stats: BatchStats,
    pub runs: Vec<ComponentRun>,
    pub summary_path: PathBuf,
}

pub struct Engine {
    source: Arc<dyn ProposalSource>,
    heuristics: Heuristics,
    config: EngineConfig,
    cancel: Arc<AtomicBool>,
}

impl Engine {
    pub fn new(source: Arc<dyn ProposalSource>, heuristics: Heuristics, config: EngineConfig) -> Self {
        Self {
            source,
            heuristics,
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cooperative cancellation handle: setting the flag lets in-flight
    /// components settle while nothing new is scheduled. Accepted artifacts
    /// are never rolled back.
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub async fn run(&self, jobs: Vec<ComponentJob>) -> Result<BatchOutcome> {
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = run_id.as_str(), components = jobs.len(), "mapping run started");

        let summary = Mutex::new(RunSummary::new(run_id));

        // Phase 1: drive runs in parallel. Each run owns its evidence,
        // attempts, and output; the summary writer is the only shared
        // resource and its writes are serialized by the lock.
        let results: Vec<Option<ComponentRun>> =
            stream::iter(jobs.into_iter().map(|job| {
                let summary = &summary;
                async move {
                    if self.cancel.load(Ordering::SeqCst) {
                        summary.lock().await.log(SummaryEvent::ComponentSkipped {
                            component: job.context.component_name.clone(),
                        });
                        return None;
                    }

                    let resolver = self.config.project_root.as_ref().map(|root| {
                        ImportResolver::new(root).with_inspected_paths(
                            job.context
                                .candidate_files
                                .iter()
                                .map(|f| f.path.clone())
                                .collect(),
                        )
                    });
                    let mut orchestrator =
                        Orchestrator::new(self.source.as_ref(), &self.heuristics)
                            .with_style(self.config.style)
                            .with_max_retries(self.config.max_retries);
                    if let Some(resolver) = resolver.as_ref() {
                        orchestrator = orchestrator.with_resolver(resolver);
                    }

                    let run = orchestrator
                        .run_component(&job.context, &job.evidence, job.surface.as_ref())
                        .await;

                    let mut log = summary.lock().await;
                    for attempt in &run.attempts {
                        if !attempt.validation.valid {
                            log.log(SummaryEvent::AttemptRejected {
                                component: run.component_name.clone(),
                                attempt: attempt.number,
                                errors: attempt.validation.errors.len() as u32,
                                unparsable: attempt.schema.is_none(),
                            });
                        }
                    }
                    match run.terminal {
                        TerminalStatus::Accepted => log.log(SummaryEvent::ComponentAccepted {
                            component: run.component_name.clone(),
                            attempts: run.attempts.len() as u32,
                        }),
                        TerminalStatus::Exhausted => log.log(SummaryEvent::ComponentExhausted {
                            component: run.component_name.clone(),
                            attempts: run.attempts.len() as u32,
                            errors: run
                                .attempts
                                .last()
                                .map(|a| a.validation.errors.len() as u32)
                                .unwrap_or(0),
                        }),
                    }
                    drop(log);
                    Some(run)
                }
            }))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        // Phase 2: sequential write phase. Artifact files are disjoint per
        // component; the arena only exists to de-collide names within this
        // run.
        let mut summary = summary.into_inner();
        let mut stats = BatchStats {
            skipped: results.iter().filter(|r| r.is_none()).count() as u32,
            ..BatchStats::default()
        };
        let writer = ArtifactWriter::new(&self.config.output_dir, &self.config.data_dir);
        let mut artifact_arena = FileArena::default();
        let mut diagnostic_arena = FileArena::default();
        let extension = match self.config.style {
            TargetStyle::ComponentCall => "figma.tsx",
            TargetStyle::TagTemplate => "figma.ts",
        };

        let mut runs: Vec<ComponentRun> = Vec::new();
        for run in results.into_iter().flatten() {
            stats.components += 1;
            stats.attempts += run.attempts.len() as u32;

            let run = match run.terminal {
                TerminalStatus::Accepted => {
                    stats.accepted += 1;
                    let file_name = artifact_arena.claim(&run.component_name, extension);
                    match run.final_code() {
                        Some(code) => match writer.write_artifact(&file_name, code) {
                            Ok(path) => {
                                stats.files_written += 1;
                                summary.log(SummaryEvent::ArtifactWritten {
                                    component: run.component_name.clone(),
                                    path: path.display().to_string(),
                                });
                                ComponentRun {
                                    artifact_path: Some(path),
                                    ..run
                                }
                            }
                            Err(e) => {
                                warn!(
                                    component = run.component_name.as_str(),
                                    error = %e,
                                    "failed to write artifact"
                                );
                                run
                            }
                        },
                        None => run,
                    }
                }
                TerminalStatus::Exhausted => {
                    stats.exhausted += 1;
                    // Diagnostic only — exhausted output never lands as a
                    // production file.
                    if let Err(e) = writer.write_diagnostic(&mut diagnostic_arena, &run) {
                        warn!(
                            component = run.component_name.as_str(),
                            error = %e,
                            "failed to write diagnostic"
                        );
                    }
                    run
                }
            };

            if let Some(warning) = &run.import_warning {
                stats.import_warnings += 1;
                summary.log(SummaryEvent::ImportUnresolved {
                    component: run.component_name.clone(),
                    warning: warning.clone(),
                });
            }
            summary.push_report(report_for(&run));
            runs.push(run);
        }

        let summary_path = summary.save(&stats, &self.config.data_dir)?;
        info!("{stats}");
        Ok(BatchOutcome {
            stats,
            runs,
            summary_path,
        })
    }
}

fn report_for(run: &ComponentRun) -> ComponentReport {
    ComponentReport {
        component_id: run.component_id.clone(),
        component: run.component_name.clone(),
        status: run.terminal,
        attempts: run.attempts.len() as u32,
        errors: run
            .attempts
            .last()
            .map(|a| a.validation.errors.clone())
            .unwrap_or_default(),
        output_path: run.artifact_path.clone(),
        import_warning: run.import_warning.clone(),
    }
}
