use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ident;

// --- Evidence ---

/// Kinds a component-set property can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyKind {
    Boolean,
    Text,
    InstanceSwap,
    Number,
}

/// One dimension of a component set, e.g. "Size" with {Small, Large}.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantAxis {
    /// First-seen raw key spelling, kept as the display label.
    pub label: String,
    /// Every raw spelling of this axis key seen across variants.
    pub raw_keys: BTreeSet<String>,
    pub values: BTreeSet<String>,
    pub enum_tokens: BTreeSet<String>,
}

impl VariantAxis {
    /// Two-option axes like Yes/No read as boolean flags downstream.
    pub fn is_two_option(&self) -> bool {
        self.values.len() == 2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProperty {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Frame,
    Group,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotLayer {
    pub name: String,
    pub kind: SlotKind,
}

/// Canonical, hashable description of one design component. Immutable once
/// built; the checksum covers the key-sorted content and is independent of
/// input ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentEvidence {
    pub id: String,
    pub name: String,
    /// Keyed by the normalized (camelCase) axis name.
    pub variant_axes: BTreeMap<String, VariantAxis>,
    pub component_properties: Vec<ComponentProperty>,
    pub text_layers: Vec<TextLayer>,
    pub slot_layers: Vec<SlotLayer>,
    pub variant_count: usize,
    pub checksum: String,
}

impl ComponentEvidence {
    /// Look up an axis by raw or normalized key spelling.
    pub fn axis(&self, key: &str) -> Option<&VariantAxis> {
        if let Some(axis) = self.variant_axes.get(ident::camel_case(key).as_str()) {
            return Some(axis);
        }
        self.variant_axes
            .values()
            .find(|a| a.label == key || a.raw_keys.contains(key))
    }

    /// Look up a declared component property by exact name.
    pub fn property(&self, name: &str) -> Option<&ComponentProperty> {
        self.component_properties.iter().find(|p| p.name == name)
    }

    pub fn text_layer(&self, name: &str) -> Option<&TextLayer> {
        self.text_layers.iter().find(|l| l.name == name)
    }

    pub fn slot_layer(&self, name: &str) -> Option<&SlotLayer> {
        self.slot_layers.iter().find(|l| l.name == name)
    }

    /// Evidence with no axes, properties, or layers — still valid, still hashable.
    pub fn is_empty(&self) -> bool {
        self.variant_axes.is_empty()
            && self.component_properties.is_empty()
            && self.text_layers.is_empty()
            && self.slot_layers.is_empty()
    }
}

// --- Mapping schema (LLM-facing) ---

/// How one prop reads from design evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum MappingKind {
    Enum,
    Boolean,
    String,
    Instance,
    TextContent,
    Children,
}

impl std::fmt::Display for MappingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingKind::Enum => write!(f, "enum"),
            MappingKind::Boolean => write!(f, "boolean"),
            MappingKind::String => write!(f, "string"),
            MappingKind::Instance => write!(f, "instance"),
            MappingKind::TextContent => write!(f, "textContent"),
            MappingKind::Children => write!(f, "children"),
        }
    }
}

/// One proposed prop: a code-facing name bound to an evidence key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropMapping {
    /// Code-facing prop name.
    pub name: String,
    /// The evidence key this prop reads: an axis name, property name,
    /// layer name, or the literal `*` for the default children slot.
    pub figma_key: String,
    pub kind: MappingKind,
    /// Design value -> code value mapping for enum props.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_mapping: Option<BTreeMap<String, serde_json::Value>>,
    /// Allowed design values, when the proposer enumerates them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SchemaStatus {
    #[default]
    Proposed,
    Accepted,
    Rejected,
}

/// A candidate code-mapping proposal, produced once per attempt by the
/// external proposal source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MappingSchema {
    /// Target code identifier: a component name or a custom-element tag.
    pub component: String,
    /// Candidate import path for the target unit, relative to the project root.
    pub import_path: String,
    #[serde(default)]
    pub props: Vec<PropMapping>,
    /// Literal example values keyed by code-facing prop name.
    #[serde(default)]
    pub example_props: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub status: SchemaStatus,
}

impl MappingSchema {
    /// Find a proposed prop by normalized evidence key.
    pub fn prop_for_key(&self, key: &str) -> Option<&PropMapping> {
        let normalized = ident::camel_case(key);
        self.props
            .iter()
            .find(|p| p.figma_key == key || ident::camel_case(&p.figma_key) == normalized)
    }
}

// --- Validation ---

/// The evidence class a failing prop needed but did not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceCategory {
    VariantAxis,
    BooleanProperty,
    TextProperty,
    InstanceSwapProperty,
    TextLayer,
    SlotLayer,
    /// The proposer response was not a structured schema at all.
    StructuredProposal,
    /// A schema that started with props must keep at least one after
    /// pseudo-state suppression.
    RetainedProp,
}

impl std::fmt::Display for EvidenceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvidenceCategory::VariantAxis => write!(f, "variant axis"),
            EvidenceCategory::BooleanProperty => write!(f, "BOOLEAN property or boolean-like axis"),
            EvidenceCategory::TextProperty => write!(f, "TEXT property or surface-backed text param"),
            EvidenceCategory::InstanceSwapProperty => write!(f, "INSTANCE_SWAP property"),
            EvidenceCategory::TextLayer => write!(f, "text layer"),
            EvidenceCategory::SlotLayer => write!(f, "slot layer"),
            EvidenceCategory::StructuredProposal => write!(f, "structured proposal"),
            EvidenceCategory::RetainedProp => write!(f, "retained prop"),
        }
    }
}

/// One structured, addressable violation. Never aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropViolation {
    pub figma_key: String,
    /// The kind the proposal attempted; absent for schema-level violations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MappingKind>,
    pub expected: EvidenceCategory,
}

impl PropViolation {
    pub fn new(figma_key: impl Into<String>, kind: MappingKind, expected: EvidenceCategory) -> Self {
        Self {
            figma_key: figma_key.into(),
            kind: Some(kind),
            expected,
        }
    }

    /// The single generic violation for an unparsable proposer response.
    pub fn unstructured() -> Self {
        Self {
            figma_key: "*".to_string(),
            kind: None,
            expected: EvidenceCategory::StructuredProposal,
        }
    }

    /// Violation for a schema whose every prop was suppressed.
    pub fn nothing_retained() -> Self {
        Self {
            figma_key: "*".to_string(),
            kind: None,
            expected: EvidenceCategory::RetainedProp,
        }
    }

    /// One human-readable line, used verbatim in retry feedback.
    pub fn describe(&self) -> String {
        match (self.expected, self.kind) {
            (EvidenceCategory::StructuredProposal, _) => {
                "proposal was not structured".to_string()
            }
            (EvidenceCategory::RetainedProp, _) => {
                "every proposed prop was suppressed as pseudo-state; map at least one functional prop"
                    .to_string()
            }
            (expected, Some(kind)) => format!(
                "prop `{}` mapped as `{}` but the evidence has no matching {}",
                self.figma_key, kind, expected
            ),
            (expected, None) => format!(
                "prop `{}` has no matching {}",
                self.figma_key, expected
            ),
        }
    }
}

/// Itemized outcome of checking one schema against one evidence record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<PropViolation>,
    /// Evidence keys dropped by pseudo-state suppression.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            suppressed: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<PropViolation>) -> Self {
        Self {
            valid: false,
            errors,
            suppressed: Vec::new(),
        }
    }
}

// --- Runs ---

/// One propose/validate/render cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    /// 1-based; strictly increasing within a run.
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<MappingSchema>,
    /// Raw proposer text when the response was not structured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    pub validation: ValidationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_code: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatus {
    Accepted,
    Exhausted,
}

impl std::fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminalStatus::Accepted => write!(f, "accepted"),
            TerminalStatus::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// The full per-component record: evidence, every attempt, and the terminal
/// state. Never mutated after reaching a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRun {
    pub component_id: String,
    pub component_name: String,
    pub evidence: ComponentEvidence,
    pub attempts: Vec<Attempt>,
    pub terminal: TerminalStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<PathBuf>,
    /// Set when import resolution fell back to the proposer's unverified path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_warning: Option<String>,
}

impl ComponentRun {
    pub fn accepted(&self) -> bool {
        self.terminal == TerminalStatus::Accepted
    }

    /// The last attempt's rendered code, if any — for accepted runs the
    /// production artifact, for exhausted runs the diagnostic best-guess.
    pub fn final_code(&self) -> Option<&str> {
        self.attempts
            .iter()
            .rev()
            .find_map(|a| a.rendered_code.as_deref())
    }
}
