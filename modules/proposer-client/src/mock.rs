//! Scripted proposal source for tests — returns a fixed sequence of
//! responses and records what each call was given, so orchestration tests
//! can assert on retry feedback without a live model.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use codeloom_common::types::ComponentEvidence;

use crate::traits::{AttemptFeedback, ProposalContext, ProposalResponse, ProposalSource};

/// What one call to the scripted proposer looked like.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub component_name: String,
    pub evidence_checksum: String,
    pub had_prior_feedback: bool,
    pub prior_violation_keys: Vec<String>,
}

#[derive(Default)]
pub struct ScriptedProposer {
    responses: Mutex<VecDeque<ProposalResponse>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProposer {
    pub fn new(responses: Vec<ProposalResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl ProposalSource for ScriptedProposer {
    async fn propose(
        &self,
        context: &ProposalContext,
        evidence: &ComponentEvidence,
        prior: Option<&AttemptFeedback>,
    ) -> Result<ProposalResponse> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            component_name: context.component_name.clone(),
            evidence_checksum: evidence.checksum.clone(),
            had_prior_feedback: prior.is_some(),
            prior_violation_keys: prior
                .map(|f| f.violations.iter().map(|v| v.figma_key.clone()).collect())
                .unwrap_or_default(),
        });
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .ok_or_else(|| anyhow!("scripted proposer ran out of responses"))
    }
}
