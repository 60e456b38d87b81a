use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use codeloom_common::heuristics::Heuristics;
use codeloom_common::ident;
use codeloom_common::types::{
    ComponentEvidence, ComponentProperty, SlotKind, SlotLayer, TextLayer, VariantAxis,
};

use crate::checksum;
use crate::node::DesignNode;

/// How deep below each variant the layer walk goes.
pub const DEFAULT_LAYER_DEPTH: usize = 3;

/// Hidden containers produce no evidence at all: empty names, `.`/`_`
/// prefixes, and names that collapse to a lone underscore.
pub fn is_hidden_component(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.is_empty()
        || trimmed.starts_with('.')
        || trimmed.starts_with('_')
        || ident::sanitize_token(trimmed) == "_"
}

/// Turns raw variant-set nodes into canonical, hashable evidence records.
pub struct Extractor {
    heuristics: Heuristics,
    max_layer_depth: usize,
}

impl Extractor {
    pub fn new(heuristics: Heuristics) -> Self {
        Self {
            heuristics,
            max_layer_depth: DEFAULT_LAYER_DEPTH,
        }
    }

    pub fn with_max_layer_depth(mut self, depth: usize) -> Self {
        self.max_layer_depth = depth;
        self
    }

    /// Extract evidence for every visible component set in the given trees,
    /// in traversal order.
    pub fn extract_all(&self, roots: &[DesignNode]) -> Vec<ComponentEvidence> {
        let mut out = Vec::new();
        for root in roots {
            self.walk_for_sets(root, &mut out);
        }
        out
    }

    fn walk_for_sets(&self, node: &DesignNode, out: &mut Vec<ComponentEvidence>) {
        if let Some(evidence) = self.extract(node) {
            out.push(evidence);
            return;
        }
        for child in node.children() {
            self.walk_for_sets(child, out);
        }
    }

    /// Extract evidence from one variant-set container. Returns `None` for
    /// non-set nodes and for hidden containers. Empty trees are fine — zero
    /// variants and zero properties is valid evidence.
    pub fn extract(&self, node: &DesignNode) -> Option<ComponentEvidence> {
        let DesignNode::ComponentSet {
            id,
            name,
            children,
            component_property_definitions,
        } = node
        else {
            return None;
        };

        if is_hidden_component(name) {
            debug!(name, "skipping hidden component set");
            return None;
        }

        let mut variant_axes: BTreeMap<String, VariantAxis> = BTreeMap::new();
        let mut variant_count = 0usize;
        let mut text_layers: Vec<TextLayer> = Vec::new();
        let mut slot_layers: Vec<SlotLayer> = Vec::new();
        let mut seen_text: BTreeSet<String> = BTreeSet::new();
        let mut seen_slots: BTreeSet<String> = BTreeSet::new();

        for child in children {
            let DesignNode::Component { name: variant_name, children: layers } = child else {
                continue;
            };
            variant_count += 1;
            parse_variant_name(variant_name, &mut variant_axes);
            for layer in layers {
                self.collect_layers(
                    layer,
                    1,
                    &mut text_layers,
                    &mut slot_layers,
                    &mut seen_text,
                    &mut seen_slots,
                );
            }
        }

        let component_properties = extract_properties(component_property_definitions);

        let mut evidence = ComponentEvidence {
            id: id.clone(),
            name: name.trim().to_string(),
            variant_axes,
            component_properties,
            text_layers,
            slot_layers,
            variant_count,
            checksum: String::new(),
        };
        evidence.checksum = checksum::compute(&evidence);
        Some(evidence)
    }

    fn collect_layers(
        &self,
        node: &DesignNode,
        depth: usize,
        text_layers: &mut Vec<TextLayer>,
        slot_layers: &mut Vec<SlotLayer>,
        seen_text: &mut BTreeSet<String>,
        seen_slots: &mut BTreeSet<String>,
    ) {
        if depth > self.max_layer_depth {
            return;
        }
        match node {
            DesignNode::Text { name, characters } => {
                if seen_text.insert(name.clone()) {
                    text_layers.push(TextLayer {
                        name: name.clone(),
                        sample_text: characters.clone(),
                    });
                }
            }
            DesignNode::Frame { name, children } | DesignNode::Group { name, children } => {
                let kind = match node {
                    DesignNode::Frame { .. } => SlotKind::Frame,
                    _ => SlotKind::Group,
                };
                let holds_instance = children
                    .iter()
                    .any(|c| matches!(c, DesignNode::Instance { .. }));
                if (self.heuristics.is_slot_name(name) || holds_instance)
                    && seen_slots.insert(name.clone())
                {
                    slot_layers.push(SlotLayer {
                        name: name.clone(),
                        kind,
                    });
                }
                for child in children {
                    self.collect_layers(child, depth + 1, text_layers, slot_layers, seen_text, seen_slots);
                }
            }
            DesignNode::Instance { children, .. }
            | DesignNode::Component { children, .. }
            | DesignNode::ComponentSet { children, .. } => {
                for child in children {
                    self.collect_layers(child, depth + 1, text_layers, slot_layers, seen_text, seen_slots);
                }
            }
        }
    }
}

/// Parse one variant's `key=value, key=value` name into the axis map.
/// Malformed segments are skipped locally, never fatal.
fn parse_variant_name(raw: &str, axes: &mut BTreeMap<String, VariantAxis>) {
    for segment in raw.split(',') {
        let Some((key, value)) = segment.split_once('=') else {
            if !segment.trim().is_empty() {
                debug!(segment = segment.trim(), "variant segment without `=`, skipping");
            }
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        let normalized = ident::camel_case(key);
        if normalized.is_empty() {
            continue;
        }
        let axis = axes.entry(normalized).or_insert_with(|| VariantAxis {
            label: key.to_string(),
            ..VariantAxis::default()
        });
        axis.raw_keys.insert(key.to_string());
        axis.values.insert(value.to_string());
        axis.enum_tokens.insert(ident::enum_token(value));
    }
}

/// Properties come from the set's own definition map only — per-variant
/// definitions are not valid downstream. `#nodeId` suffixes are stripped
/// and variant-axis entries dropped.
fn extract_properties(
    definitions: &BTreeMap<String, crate::node::PropertyDefinition>,
) -> Vec<ComponentProperty> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut props = Vec::new();
    for (key, definition) in definitions {
        let Some(kind) = definition.kind.as_property_kind() else {
            continue;
        };
        let name = match key.split_once('#') {
            Some((base, _)) => base.trim(),
            None => key.trim(),
        };
        if name.is_empty() || !seen.insert(name.to_string()) {
            continue;
        }
        props.push(ComponentProperty {
            name: name.to_string(),
            kind,
            default_value: definition.default_value.clone(),
        });
    }
    props
}
