//! Renderer tests — EVIDENCE + SCHEMA → RENDER → assert on the emitted code.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;

use codeloom_common::heuristics::Heuristics;
use codeloom_common::ident;
use codeloom_common::types::{
    ComponentEvidence, ComponentProperty, MappingKind, MappingSchema, PropMapping, PropertyKind,
    SlotKind, SlotLayer, TextLayer, VariantAxis,
};

use crate::renderer::{RenderRequest, Renderer, TargetStyle};
use crate::surface::PropSurface;

fn axis(label: &str, values: &[&str]) -> VariantAxis {
    VariantAxis {
        label: label.to_string(),
        raw_keys: [label.to_string()].into(),
        values: values.iter().map(|v| v.to_string()).collect(),
        enum_tokens: values.iter().map(|v| ident::enum_token(v)).collect(),
    }
}

fn empty_evidence() -> ComponentEvidence {
    ComponentEvidence {
        id: "1:1".to_string(),
        name: "Button".to_string(),
        variant_axes: BTreeMap::new(),
        component_properties: vec![],
        text_layers: vec![],
        slot_layers: vec![],
        variant_count: 0,
        checksum: "abc".to_string(),
    }
}

fn size_evidence() -> ComponentEvidence {
    ComponentEvidence {
        variant_axes: BTreeMap::from([("size".to_string(), axis("Size", &["Small", "Large"]))]),
        variant_count: 2,
        ..empty_evidence()
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
        import_path: "src/Button".to_string(),
        props,
        example_props: BTreeMap::new(),
        status: Default::default(),
    }
}

fn render(evidence: &ComponentEvidence, schema: &MappingSchema, surface: Option<&PropSurface>) -> String {
    let heuristics = Heuristics::default();
    Renderer::new(&heuristics)
        .render(&RenderRequest {
            schema,
            evidence,
            style: TargetStyle::ComponentCall,
            surface,
        })
        .code
}

#[test]
fn rendering_is_idempotent() {
    let evidence = size_evidence();
    let mapping = schema(vec![prop("size", "Size", MappingKind::Enum)]);
    let first = render(&evidence, &mapping, None);
    let second = render(&evidence, &mapping, None);
    assert_eq!(first, second);
}

#[test]
fn enum_axis_renders_with_both_mapped_values() {
    let evidence = size_evidence();
    let mut mapping = schema(vec![PropMapping {
        name: "size".to_string(),
        figma_key: "Size".to_string(),
        kind: MappingKind::Enum,
        value_mapping: Some(BTreeMap::from([
            ("Small".to_string(), json!("sm")),
            ("Large".to_string(), json!("lg")),
        ])),
        values: None,
    }]);
    mapping.example_props.insert("size".to_string(), json!("sm"));

    let code = render(&evidence, &mapping, None);
    assert!(code.contains("size: figma.enum(\"Size\", {"), "{code}");
    assert!(code.contains("Small: \"sm\""), "{code}");
    assert!(code.contains("Large: \"lg\""), "{code}");
    assert!(code.contains("size = \"sm\""), "{code}");
    assert!(code.contains("import { Button } from \"src/Button\";"), "{code}");
}

#[test]
fn evidence_wins_over_invented_schema_props() {
    // The schema invents a `tone` enum with no matching axis — the derived
    // prop list comes from evidence, so only `size` survives.
    let evidence = size_evidence();
    let mapping = schema(vec![
        prop("size", "Size", MappingKind::Enum),
        prop("tone", "Tone", MappingKind::Enum),
    ]);
    let code = render(&evidence, &mapping, None);
    assert!(code.contains("figma.enum(\"Size\""));
    assert!(!code.contains("Tone"), "{code}");
}

#[test]
fn schema_naming_intent_is_adopted_for_known_keys() {
    let evidence = size_evidence();
    let mapping = schema(vec![prop("buttonSize", "Size", MappingKind::Enum)]);
    let code = render(&evidence, &mapping, None);
    assert!(code.contains("buttonSize: figma.enum(\"Size\""), "{code}");
}

#[test]
fn axes_render_even_when_the_schema_missed_them() {
    let evidence = size_evidence();
    let code = render(&evidence, &schema(vec![]), None);
    // Name falls back to the normalized axis key; values map to enum tokens.
    assert!(code.contains("size: figma.enum(\"Size\", {"), "{code}");
    assert!(code.contains("Small: \"small\""), "{code}");
}

#[test]
fn pseudo_state_axis_never_leaks_into_rendered_props() {
    let mut evidence = size_evidence();
    evidence
        .variant_axes
        .insert("state".to_string(), axis("State", &["Default", "Hover"]));

    let mapping = schema(vec![prop("size", "Size", MappingKind::Enum)]);
    let code = render(&evidence, &mapping, None);
    assert!(!code.contains("State"), "{code}");

    let surface = PropSurface::from_names(["state", "size"]);
    let with_surface = render(&evidence, &mapping, Some(&surface));
    assert!(with_surface.contains("figma.enum(\"State\""), "{with_surface}");
}

#[test]
fn boolean_pair_axis_keeps_the_schema_boolean_kind() {
    let mut evidence = empty_evidence();
    evidence
        .variant_axes
        .insert("showIcon".to_string(), axis("Show icon", &["Yes", "No"]));
    let mapping = schema(vec![prop("showIcon", "Show icon", MappingKind::Boolean)]);
    let code = render(&evidence, &mapping, None);
    assert!(code.contains("showIcon: figma.boolean(\"Show icon\")"), "{code}");
}

#[test]
fn instances_are_gated_by_their_presence_flag() {
    let mut evidence = empty_evidence();
    evidence.component_properties = vec![
        ComponentProperty {
            name: "Has icon".to_string(),
            kind: PropertyKind::Boolean,
            default_value: Some(json!(true)),
        },
        ComponentProperty {
            name: "Icon".to_string(),
            kind: PropertyKind::InstanceSwap,
            default_value: None,
        },
    ];
    let code = render(&evidence, &schema(vec![]), None);
    assert!(code.contains("{hasIcon && icon}"), "{code}");
    // The gate renders only as the guard, not as a duplicated attribute.
    assert!(!code.contains("hasIcon={hasIcon}"), "{code}");
}

#[test]
fn derived_names_coerce_onto_a_unique_surface_slot() {
    let mut evidence = empty_evidence();
    evidence.component_properties = vec![ComponentProperty {
        name: "Leading icon".to_string(),
        kind: PropertyKind::InstanceSwap,
        default_value: None,
    }];

    // Exactly one left-slot name on the surface: rename fires.
    let surface = PropSurface::from_names(["startSlot", "label"]);
    let code = render(&evidence, &schema(vec![]), Some(&surface));
    assert!(code.contains("startSlot: figma.instance(\"Leading icon\")"), "{code}");

    // Already a legal surface name: no rename.
    let surface = PropSurface::from_names(["leadingIcon", "startSlot"]);
    let code = render(&evidence, &schema(vec![]), Some(&surface));
    assert!(code.contains("leadingIcon: figma.instance(\"Leading icon\")"), "{code}");

    // Two plausible targets: ambiguous, keep the derived name.
    let surface = PropSurface::from_names(["startSlot", "leftAddon"]);
    let code = render(&evidence, &schema(vec![]), Some(&surface));
    assert!(code.contains("leadingIcon: figma.instance(\"Leading icon\")"), "{code}");
}

#[test]
fn text_props_require_corroboration_on_one_side() {
    let evidence = empty_evidence();
    let mapping = schema(vec![prop("label", "label", MappingKind::String)]);

    let uncorroborated = render(&evidence, &mapping, None);
    assert!(!uncorroborated.contains("figma.string"), "{uncorroborated}");

    let surface = PropSurface::from_names(["label"]);
    let corroborated = render(&evidence, &mapping, Some(&surface));
    assert!(corroborated.contains("label: figma.string(\"label\")"), "{corroborated}");
}

#[test]
fn text_layers_and_wildcard_children_render_in_the_body() {
    let mut evidence = empty_evidence();
    evidence.text_layers = vec![TextLayer {
        name: "Label".to_string(),
        sample_text: Some("Button".to_string()),
    }];
    evidence.slot_layers = vec![SlotLayer {
        name: "Content".to_string(),
        kind: SlotKind::Frame,
    }];
    let mapping = schema(vec![
        prop("label", "Label", MappingKind::TextContent),
        prop("children", "*", MappingKind::Children),
    ]);
    let code = render(&evidence, &mapping, None);
    assert!(code.contains("label: figma.textContent(\"Label\")"), "{code}");
    assert!(code.contains("children: figma.children(\"*\")"), "{code}");
    assert!(code.contains("{label}"), "{code}");
    assert!(code.contains("{children}"), "{code}");
    assert!(code.contains("</Button>"), "{code}");
}

#[test]
fn non_identifier_mapping_keys_are_quoted() {
    let mut evidence = empty_evidence();
    evidence
        .variant_axes
        .insert("kind".to_string(), axis("Kind", &["Primary", "With icon"]));
    let code = render(&evidence, &schema(vec![]), None);
    assert!(code.contains("\"With icon\": \"with_icon\""), "{code}");
    assert!(code.contains("Primary: \"primary\""), "{code}");
}

#[test]
fn evidence_defaults_feed_the_destructured_example() {
    let mut evidence = empty_evidence();
    evidence.component_properties = vec![ComponentProperty {
        name: "Disabled".to_string(),
        kind: PropertyKind::Boolean,
        default_value: Some(json!(false)),
    }];
    let code = render(&evidence, &schema(vec![]), None);
    assert!(code.contains("({ disabled = false })"), "{code}");
    assert!(code.contains("disabled={disabled}"), "{code}");
}

#[test]
fn tag_template_style_emits_a_lit_flavored_example() {
    let mut evidence = empty_evidence();
    evidence
        .variant_axes
        .insert("size".to_string(), axis("Size", &["Small", "Large"]));
    evidence.component_properties = vec![ComponentProperty {
        name: "Disabled".to_string(),
        kind: PropertyKind::Boolean,
        default_value: None,
    }];

    let heuristics = Heuristics::default();
    let mapping = MappingSchema {
        component: "acme-button".to_string(),
        import_path: "src/acme-button".to_string(),
        props: vec![],
        example_props: BTreeMap::new(),
        status: Default::default(),
    };
    let code = Renderer::new(&heuristics)
        .render(&RenderRequest {
            schema: &mapping,
            evidence: &evidence,
            style: TargetStyle::TagTemplate,
            surface: None,
        })
        .code;
    assert!(code.contains("import \"src/acme-button\";"), "{code}");
    assert!(code.contains("figma.connect(\"acme-button\""), "{code}");
    assert!(code.contains("size=${size}"), "{code}");
    assert!(code.contains("?disabled=${disabled}"), "{code}");
    assert!(code.contains("</acme-button>`"), "{code}");
}

#[test]
fn prop_less_components_render_an_empty_props_block() {
    let code = render(&empty_evidence(), &schema(vec![]), None);
    assert!(code.contains("props: {},"), "{code}");
    assert!(code.contains("example: () => (\n    <Button />\n  ),"), "{code}");
}
