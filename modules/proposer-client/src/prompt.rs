//! Prompt assembly for proposal calls.

use codeloom_common::types::ComponentEvidence;

use crate::traits::{AttemptFeedback, ProposalContext};

pub const PROPOSAL_SYSTEM_PROMPT: &str = r#"You are a design-to-code mapping proposer.

Given the canonical evidence for one design component (variant axes, declared properties, text layers, slot layers) and the candidate source files that implement it, propose a mapping schema:

- `component`: the exported identifier (or custom-element tag) of the target unit.
- `importPath`: the path of the file that exports it, relative to the project root.
- `props`: one entry per functional prop. `figmaKey` must be an evidence key that actually exists:
  - `enum` -> a variant axis (include `valueMapping` from design values to code values)
  - `boolean` -> a BOOLEAN property, or a Yes/No-style two-value axis
  - `string` -> a TEXT property, or a textual parameter the code itself declares
  - `instance` -> an INSTANCE_SWAP property
  - `textContent` -> a text layer name
  - `children` -> a slot layer name, or `*` for the default slot
- `exampleProps`: realistic literal example values keyed by prop name.

Do not map purely visual interaction state (hover/focus/pressed variants) as props. Do not invent props the evidence cannot back. Prefer the prop names the consuming code already uses."#;

/// Build the user prompt. Every call carries the full evidence and file
/// context — prior attempts are summarized explicitly, never assumed.
pub fn user_prompt(
    context: &ProposalContext,
    evidence: &ComponentEvidence,
    prior: Option<&AttemptFeedback>,
) -> String {
    let evidence_json = serde_json::to_string_pretty(evidence)
        .unwrap_or_else(|_| "{}".to_string());

    let mut prompt = format!(
        "Component: {}\n\nEvidence:\n{}\n",
        context.component_name, evidence_json
    );

    if !context.candidate_files.is_empty() {
        prompt.push_str("\nCandidate source files:\n");
        for file in &context.candidate_files {
            prompt.push_str(&format!("--- {} ---\n{}\n", file.path, file.contents));
        }
    }

    if let Some(instructions) = &context.extra_instructions {
        prompt.push_str(&format!("\nAdditional instructions:\n{instructions}\n"));
    }

    if let Some(feedback) = prior {
        prompt.push_str(&format!(
            "\nYour attempt #{} was rejected. Violations:\n",
            feedback.attempt_number
        ));
        for violation in &feedback.violations {
            prompt.push_str(&format!("- {}\n", violation.describe()));
        }
        if !feedback.suppressed.is_empty() {
            prompt.push_str(&format!(
                "Suppressed as pseudo-state (do not re-propose): {}\n",
                feedback.suppressed.join(", ")
            ));
        }
        if let Some(raw) = &feedback.raw_response {
            prompt.push_str(&format!("\nYour previous response:\n{raw}\n"));
        }
        if let Some(code) = &feedback.rendered_code {
            prompt.push_str(&format!("\nCode rendered from it:\n{code}\n"));
        }
        prompt.push_str("\nPropose a corrected schema that fixes every violation.\n");
    }

    prompt
}
