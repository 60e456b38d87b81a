//! Keyword vocabularies for slot detection, pseudo-state suppression, and
//! surface coercion.
//!
//! These are tuned judgment calls, kept as data so deployments can override
//! them without touching validator or renderer control flow.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Where a slot-like prop lands relative to the primary children slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSide {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Heuristics {
    /// Container layer names treated as slot layers.
    pub slot_vocabulary: Vec<String>,
    /// Axis names that encode purely visual interaction state.
    pub pseudo_state_axes: Vec<String>,
    /// Words that mark a `.`-prefixed boolean flag as interaction-scoped.
    pub interaction_words: Vec<String>,
    /// Two-option value pairs that validate as boolean mappings.
    pub boolean_pairs: Vec<(String, String)>,
    /// Evidence keys that may map to textual props when corroborated.
    pub text_vocabulary: Vec<String>,
    /// Keywords that classify a prop onto the surface's left slot.
    pub left_slot_keywords: Vec<String>,
    /// Keywords that classify a prop onto the surface's right slot.
    pub right_slot_keywords: Vec<String>,
    /// Surface parameter names that read as a generic icon slot.
    pub icon_keywords: Vec<String>,
}

impl Default for Heuristics {
    fn default() -> Self {
        fn strings(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }
        Self {
            slot_vocabulary: strings(&[
                "icon", "leading", "trailing", "prefix", "suffix", "content", "children",
                "slot", "container", "start", "end", "left", "right",
            ]),
            pseudo_state_axes: strings(&["state", "interaction"]),
            interaction_words: strings(&[
                "hover", "focus", "active", "pressed", "selected", "current",
            ]),
            boolean_pairs: vec![
                ("yes".to_string(), "no".to_string()),
                ("true".to_string(), "false".to_string()),
                ("on".to_string(), "off".to_string()),
            ],
            text_vocabulary: strings(&["children", "label", "text", "content", "title"]),
            left_slot_keywords: strings(&["start", "left", "leading", "prefix"]),
            right_slot_keywords: strings(&["end", "right", "trailing", "suffix"]),
            icon_keywords: strings(&["icon"]),
        }
    }
}

impl Heuristics {
    /// Container names matching the slot vocabulary (case-insensitive).
    pub fn is_slot_name(&self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        self.slot_vocabulary.iter().any(|w| *w == lower)
    }

    pub fn is_pseudo_state_axis(&self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        self.pseudo_state_axes.iter().any(|w| *w == lower)
    }

    /// Variant-scoped boolean flags: a leading `.` plus interaction wording.
    pub fn is_interaction_flag(&self, key: &str) -> bool {
        if !key.starts_with('.') {
            return false;
        }
        let lower = key.to_lowercase();
        self.interaction_words.iter().any(|w| lower.contains(w.as_str()))
    }

    /// Whether a two-option axis value set reads as a boolean pair
    /// (Yes/No, True/False, On/Off — case-insensitive).
    pub fn is_boolean_pair(&self, values: &BTreeSet<String>) -> bool {
        if values.len() != 2 {
            return false;
        }
        let lowered: BTreeSet<String> = values.iter().map(|v| v.to_lowercase()).collect();
        self.boolean_pairs.iter().any(|(a, b)| {
            let pair: BTreeSet<String> = [a.clone(), b.clone()].into();
            pair == lowered
        })
    }

    pub fn is_text_vocabulary(&self, key: &str) -> bool {
        let lower = key.trim().to_lowercase();
        self.text_vocabulary.iter().any(|w| *w == lower)
    }

    /// Classify a prop name relative to the primary children slot.
    pub fn classify_side(&self, name: &str) -> SlotSide {
        let lower = name.to_lowercase();
        if self.left_slot_keywords.iter().any(|w| lower.contains(w.as_str())) {
            SlotSide::Left
        } else if self.right_slot_keywords.iter().any(|w| lower.contains(w.as_str())) {
            SlotSide::Right
        } else {
            SlotSide::Middle
        }
    }

    pub fn is_icon_like(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.icon_keywords.iter().any(|w| lower.contains(w.as_str()))
    }
}
