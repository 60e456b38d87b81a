//! Schema validation — each proposed prop is checked against the evidence
//! contract for its kind, producing one addressable violation per failure.

use tracing::debug;

use codeloom_common::heuristics::Heuristics;
use codeloom_common::ident;
use codeloom_common::types::{
    ComponentEvidence, EvidenceCategory, MappingKind, MappingSchema, PropMapping, PropViolation,
    PropertyKind, ValidationResult,
};

use crate::surface::PropSurface;

pub struct Validator<'a> {
    heuristics: &'a Heuristics,
}

impl<'a> Validator<'a> {
    pub fn new(heuristics: &'a Heuristics) -> Self {
        Self { heuristics }
    }

    /// Check every prop of `schema` against `evidence`. A schema with zero
    /// props is trivially valid (prop-less components exist); a schema whose
    /// every prop gets suppressed as pseudo-state is not.
    pub fn validate(
        &self,
        schema: &MappingSchema,
        evidence: &ComponentEvidence,
        surface: Option<&PropSurface>,
    ) -> ValidationResult {
        let mut errors = Vec::new();
        let mut suppressed = Vec::new();
        let mut retained = 0usize;

        for prop in &schema.props {
            if self.is_suppressed(prop, evidence, surface) {
                debug!(figma_key = prop.figma_key.as_str(), "pseudo-state prop suppressed");
                suppressed.push(prop.figma_key.clone());
                continue;
            }
            match self.check(prop, evidence, surface) {
                Ok(()) => retained += 1,
                Err(violation) => errors.push(violation),
            }
        }

        if errors.is_empty() && !schema.props.is_empty() && retained == 0 {
            errors.push(PropViolation::nothing_retained());
        }

        ValidationResult {
            valid: errors.is_empty(),
            errors,
            suppressed,
        }
    }

    /// Pseudo-state suppression: visual interaction state never becomes a
    /// functional prop unless the consuming surface explicitly asks for it.
    fn is_suppressed(
        &self,
        prop: &PropMapping,
        evidence: &ComponentEvidence,
        surface: Option<&PropSurface>,
    ) -> bool {
        match prop.kind {
            MappingKind::Enum => {
                self.heuristics.is_pseudo_state_axis(&prop.figma_key)
                    && evidence.axis(&prop.figma_key).is_some()
                    && !surface_references(surface, &prop.figma_key)
            }
            MappingKind::Boolean => {
                self.heuristics.is_interaction_flag(&prop.figma_key)
                    && !surface_references(surface, &ident::sanitize_identifier(&prop.figma_key))
            }
            _ => false,
        }
    }

    fn check(
        &self,
        prop: &PropMapping,
        evidence: &ComponentEvidence,
        surface: Option<&PropSurface>,
    ) -> Result<(), PropViolation> {
        let key = prop.figma_key.as_str();
        match prop.kind {
            MappingKind::Enum => {
                if evidence.axis(key).is_some() {
                    Ok(())
                } else {
                    Err(PropViolation::new(key, prop.kind, EvidenceCategory::VariantAxis))
                }
            }
            MappingKind::Boolean => {
                let declared = evidence
                    .property(key)
                    .is_some_and(|p| p.kind == PropertyKind::Boolean);
                let boolean_axis = evidence
                    .axis(key)
                    .is_some_and(|a| self.heuristics.is_boolean_pair(&a.values));
                if declared || boolean_axis {
                    Ok(())
                } else {
                    Err(PropViolation::new(key, prop.kind, EvidenceCategory::BooleanProperty))
                }
            }
            MappingKind::String => {
                let declared = evidence
                    .property(key)
                    .is_some_and(|p| p.kind == PropertyKind::Text);
                let vocab_backed = self.heuristics.is_text_vocabulary(key)
                    && surface.is_some_and(|s| s.contains_ci(key));
                if declared || vocab_backed {
                    Ok(())
                } else {
                    Err(PropViolation::new(key, prop.kind, EvidenceCategory::TextProperty))
                }
            }
            MappingKind::Instance => {
                if evidence
                    .property(key)
                    .is_some_and(|p| p.kind == PropertyKind::InstanceSwap)
                {
                    Ok(())
                } else {
                    Err(PropViolation::new(
                        key,
                        prop.kind,
                        EvidenceCategory::InstanceSwapProperty,
                    ))
                }
            }
            MappingKind::TextContent => {
                if evidence.text_layer(key).is_some() {
                    Ok(())
                } else {
                    Err(PropViolation::new(key, prop.kind, EvidenceCategory::TextLayer))
                }
            }
            MappingKind::Children => {
                if key == "*" || evidence.slot_layer(key).is_some() {
                    Ok(())
                } else {
                    Err(PropViolation::new(key, prop.kind, EvidenceCategory::SlotLayer))
                }
            }
        }
    }
}

/// Whether the consuming surface explicitly references `key`, under either
/// its raw or normalized spelling.
pub(crate) fn surface_references(surface: Option<&PropSurface>, key: &str) -> bool {
    surface.is_some_and(|s| s.contains_ci(key) || s.contains_ci(&ident::camel_case(key)))
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use codeloom_common::types::{ComponentProperty, SlotKind, SlotLayer, TextLayer, VariantAxis};
    use serde_json::json;

    fn axis(label: &str, values: &[&str]) -> VariantAxis {
        VariantAxis {
            label: label.to_string(),
            raw_keys: [label.to_string()].into(),
            values: values.iter().map(|v| v.to_string()).collect(),
            enum_tokens: values.iter().map(|v| ident::enum_token(v)).collect(),
        }
    }

    fn evidence() -> ComponentEvidence {
        ComponentEvidence {
            id: "1:1".to_string(),
            name: "Button".to_string(),
            variant_axes: BTreeMap::from([
                ("size".to_string(), axis("Size", &["Small", "Large"])),
                ("showIcon".to_string(), axis("Show icon", &["Yes", "No"])),
                ("state".to_string(), axis("State", &["Default", "Hover"])),
            ]),
            component_properties: vec![
                ComponentProperty {
                    name: "Disabled".to_string(),
                    kind: PropertyKind::Boolean,
                    default_value: Some(json!(false)),
                },
                ComponentProperty {
                    name: "Label".to_string(),
                    kind: PropertyKind::Text,
                    default_value: Some(json!("Button")),
                },
            ],
            text_layers: vec![TextLayer {
                name: "Label".to_string(),
                sample_text: Some("Button".to_string()),
            }],
            slot_layers: vec![SlotLayer {
                name: "Icon".to_string(),
                kind: SlotKind::Frame,
            }],
            variant_count: 8,
            checksum: "abc".to_string(),
        }
    }

    fn prop(name: &str, key: &str, kind: MappingKind) -> PropMapping {
        PropMapping {
            name: name.to_string(),
            figma_key: key.to_string(),
            kind,
            value_mapping: None,
            values: None,
        }
    }

    fn schema(props: Vec<PropMapping>) -> MappingSchema {
        MappingSchema {
            component: "Button".to_string(),
            import_path: "src/Button.tsx".to_string(),
            props,
            example_props: BTreeMap::new(),
            status: Default::default(),
        }
    }

    fn validate(props: Vec<PropMapping>) -> ValidationResult {
        let heuristics = Heuristics::default();
        Validator::new(&heuristics).validate(&schema(props), &evidence(), None)
    }

    #[test]
    fn declared_axis_enum_is_valid() {
        let result = validate(vec![prop("size", "Size", MappingKind::Enum)]);
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn declared_boolean_property_is_valid() {
        let result = validate(vec![prop("disabled", "Disabled", MappingKind::Boolean)]);
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn yes_no_axis_validates_as_boolean() {
        let result = validate(vec![prop("showIcon", "Show icon", MappingKind::Boolean)]);
        assert!(result.valid, "{:?}", result.errors);
    }

    #[test]
    fn missing_instance_property_yields_one_itemized_error() {
        let result = validate(vec![prop("icon", "Icon", MappingKind::Instance)]);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        let violation = &result.errors[0];
        assert_eq!(violation.figma_key, "Icon");
        assert_eq!(violation.kind, Some(MappingKind::Instance));
        assert_eq!(violation.expected, EvidenceCategory::InstanceSwapProperty);
    }

    #[test]
    fn every_unknown_key_gets_its_own_error() {
        let result = validate(vec![
            prop("tone", "Tone", MappingKind::Enum),
            prop("busy", "Busy", MappingKind::Boolean),
            prop("caption", "Caption", MappingKind::TextContent),
        ]);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 3);
        let keys: Vec<&str> = result.errors.iter().map(|e| e.figma_key.as_str()).collect();
        assert_eq!(keys, vec!["Tone", "Busy", "Caption"]);
    }

    #[test]
    fn pseudo_state_axis_is_suppressed_without_surface_backing() {
        let result = validate(vec![
            prop("size", "Size", MappingKind::Enum),
            prop("state", "State", MappingKind::Enum),
        ]);
        assert!(result.valid);
        assert_eq!(result.suppressed, vec!["State".to_string()]);
    }

    #[test]
    fn pseudo_state_axis_survives_when_surface_names_it() {
        let heuristics = Heuristics::default();
        let surface = PropSurface::from_names(["state"]);
        let result = Validator::new(&heuristics).validate(
            &schema(vec![prop("state", "State", MappingKind::Enum)]),
            &evidence(),
            Some(&surface),
        );
        assert!(result.valid);
        assert!(result.suppressed.is_empty());
    }

    #[test]
    fn interaction_flag_booleans_are_suppressed() {
        let result = validate(vec![
            prop("size", "Size", MappingKind::Enum),
            prop("hovered", ".hover state", MappingKind::Boolean),
        ]);
        assert!(result.valid);
        assert_eq!(result.suppressed, vec![".hover state".to_string()]);
    }

    #[test]
    fn schema_suppressed_to_nothing_is_invalid() {
        let result = validate(vec![prop("state", "State", MappingKind::Enum)]);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].expected, EvidenceCategory::RetainedProp);
    }

    #[test]
    fn empty_schema_is_trivially_valid() {
        let result = validate(vec![]);
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn vocabulary_strings_need_surface_corroboration() {
        let heuristics = Heuristics::default();
        let validator = Validator::new(&heuristics);
        let props = vec![prop("children", "children", MappingKind::String)];

        let bare = validator.validate(&schema(props.clone()), &evidence(), None);
        assert!(!bare.valid);
        assert_eq!(bare.errors[0].expected, EvidenceCategory::TextProperty);

        let surface = PropSurface::from_names(["children"]);
        let backed = validator.validate(&schema(props), &evidence(), Some(&surface));
        assert!(backed.valid);
    }

    #[test]
    fn children_accepts_slot_layers_and_wildcard() {
        assert!(validate(vec![prop("children", "Icon", MappingKind::Children)]).valid);
        assert!(validate(vec![prop("children", "*", MappingKind::Children)]).valid);
        assert!(!validate(vec![prop("children", "Footer", MappingKind::Children)]).valid);
    }

    #[test]
    fn text_content_requires_a_declared_text_layer() {
        assert!(validate(vec![prop("label", "Label", MappingKind::TextContent)]).valid);
        assert!(!validate(vec![prop("label", "Caption", MappingKind::TextContent)]).valid);
    }
}
