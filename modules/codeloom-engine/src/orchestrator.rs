//! Drives one component through repeated propose/validate/render cycles.
//!
//! Shared-nothing by construction: everything a run touches is owned by the
//! run, so one component's retries or exhaustion can never leak into
//! another's evidence, attempt count, or output.

use chrono::Utc;
use tracing::{info, warn};

use codeloom_common::config::clamp_retries;
use codeloom_common::heuristics::Heuristics;
use codeloom_common::types::{
    Attempt, ComponentEvidence, ComponentRun, PropViolation, TerminalStatus, ValidationResult,
};
use codeloom_mapper::imports::ImportResolver;
use codeloom_mapper::renderer::{RenderRequest, Renderer, TargetStyle};
use codeloom_mapper::surface::PropSurface;
use codeloom_mapper::validator::Validator;
use proposer_client::traits::{
    AttemptFeedback, ProposalContext, ProposalResponse, ProposalSource,
};

use crate::state::{transition, RunState};

pub struct Orchestrator<'a> {
    source: &'a dyn ProposalSource,
    heuristics: &'a Heuristics,
    resolver: Option<&'a ImportResolver>,
    style: TargetStyle,
    max_retries: u32,
}

impl<'a> Orchestrator<'a> {
    pub fn new(source: &'a dyn ProposalSource, heuristics: &'a Heuristics) -> Self {
        Self {
            source,
            heuristics,
            resolver: None,
            style: TargetStyle::default(),
            max_retries: 2,
        }
    }

    pub fn with_style(mut self, style: TargetStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = clamp_retries(max_retries);
        self
    }

    pub fn with_resolver(mut self, resolver: &'a ImportResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Run one component to a terminal state. Never fails the caller —
    /// exhaustion is a recorded outcome, not an error.
    pub async fn run_component(
        &self,
        context: &ProposalContext,
        evidence: &ComponentEvidence,
        surface: Option<&PropSurface>,
    ) -> ComponentRun {
        let validator = Validator::new(self.heuristics);
        let mut renderer = Renderer::new(self.heuristics);
        if let Some(resolver) = self.resolver {
            renderer = renderer.with_resolver(resolver);
        }

        let mut attempts: Vec<Attempt> = Vec::new();
        let mut feedback: Option<AttemptFeedback> = None;
        let mut import_warning: Option<String> = None;
        let mut state = RunState::Proposing;
        let mut attempt_index: u32 = 0;

        while state == RunState::Proposing {
            let response = match self.source.propose(context, evidence, feedback.as_ref()).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(
                        component = context.component_name.as_str(),
                        error = %e,
                        "proposal call failed"
                    );
                    ProposalResponse::Unparsable(format!("proposal call failed: {e}"))
                }
            };
            state = transition(state, false, attempt_index, self.max_retries);

            let (schema, raw_response, validation) = match response {
                ProposalResponse::Schema(schema) => {
                    let validation = validator.validate(&schema, evidence, surface);
                    (Some(schema), None, validation)
                }
                ProposalResponse::Unparsable(raw) => (
                    None,
                    Some(raw),
                    ValidationResult::failed(vec![PropViolation::unstructured()]),
                ),
            };

            let mut rendered_code = None;
            if validation.valid {
                if let Some(schema) = &schema {
                    let rendered = renderer.render(&RenderRequest {
                        schema,
                        evidence,
                        style: self.style,
                        surface,
                    });
                    rendered_code = Some(rendered.code);
                    import_warning = rendered.import_warning;
                }
            }

            let accepted = validation.valid && rendered_code.is_some();
            state = transition(state, accepted, attempt_index, self.max_retries);

            attempts.push(Attempt {
                number: attempt_index + 1,
                schema: schema.clone(),
                raw_response: raw_response.clone(),
                validation: validation.clone(),
                rendered_code: rendered_code.clone(),
                at: Utc::now(),
            });

            if state == RunState::Proposing {
                // Package everything the next call needs — retries are
                // stateless and self-contained.
                feedback = Some(AttemptFeedback {
                    attempt_number: attempt_index + 1,
                    raw_response: raw_response.or_else(|| {
                        schema.as_ref().and_then(|s| serde_json::to_string(s).ok())
                    }),
                    rendered_code,
                    violations: validation.errors.clone(),
                    suppressed: validation.suppressed.clone(),
                });
                attempt_index += 1;
            }
        }

        let terminal = match state {
            RunState::Accepted => TerminalStatus::Accepted,
            _ => TerminalStatus::Exhausted,
        };
        info!(
            component = context.component_name.as_str(),
            attempts = attempts.len(),
            status = %terminal,
            "component run settled"
        );

        ComponentRun {
            component_id: evidence.id.clone(),
            component_name: context.component_name.clone(),
            evidence: evidence.clone(),
            attempts,
            terminal,
            artifact_path: None,
            import_warning,
        }
    }
}
