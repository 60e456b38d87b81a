use anyhow::Result;
use async_trait::async_trait;

use codeloom_common::types::{ComponentEvidence, MappingSchema, PropViolation};

/// One source file the proposer may read when picking an import path.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: String,
    pub contents: String,
}

/// Everything a proposal call needs. Resent in full on every call — the
/// proposal source is stateless, so nothing can drift through hidden
/// context between retries.
#[derive(Debug, Clone, Default)]
pub struct ProposalContext {
    pub component_name: String,
    /// Candidate source files oriented by the external collaborator.
    pub candidate_files: Vec<SourceFile>,
    pub extra_instructions: Option<String>,
}

/// What the previous cycle produced, packaged for the next proposal call.
#[derive(Debug, Clone, Default)]
pub struct AttemptFeedback {
    pub attempt_number: u32,
    /// The prior raw proposer output (schema JSON or unparsable text).
    pub raw_response: Option<String>,
    /// Code rendered from the prior schema, when rendering happened.
    pub rendered_code: Option<String>,
    /// Itemized violations — one per offending prop, never a blob.
    pub violations: Vec<PropViolation>,
    /// Evidence keys dropped by pseudo-state suppression.
    pub suppressed: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum ProposalResponse {
    Schema(MappingSchema),
    /// The proposer returned something that did not parse as a schema.
    /// Routed through the same retry path as a contract violation.
    Unparsable(String),
}

/// The external proposal source: given evidence and optional prior-attempt
/// feedback, produce a candidate mapping schema.
#[async_trait]
pub trait ProposalSource: Send + Sync {
    async fn propose(
        &self,
        context: &ProposalContext,
        evidence: &ComponentEvidence,
        prior: Option<&AttemptFeedback>,
    ) -> Result<ProposalResponse>;
}
