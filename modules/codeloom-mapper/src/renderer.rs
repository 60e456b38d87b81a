//! Deterministic code rendering for validated schemas.
//!
//! The authoritative prop list comes from evidence, not from the proposal;
//! the proposal contributes naming intent, value mappings, and example
//! values. Identical inputs (plus identical filesystem probe results)
//! always produce identical output bytes.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use codeloom_common::error::CodeloomError;
use codeloom_common::heuristics::{Heuristics, SlotSide};
use codeloom_common::ident;
use codeloom_common::types::{ComponentEvidence, MappingKind, MappingSchema, PropertyKind, VariantAxis};

use crate::imports::ImportResolver;
use crate::surface::PropSurface;
use crate::validator::surface_references;

/// Which flavor of consuming code the rendered unit targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetStyle {
    /// `<Button size={size}>` component-call output.
    #[default]
    ComponentCall,
    /// `` html`<my-button size=${size}>` `` tag-template output.
    TagTemplate,
}

impl FromStr for TargetStyle {
    type Err = CodeloomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "component-call" => Ok(TargetStyle::ComponentCall),
            "tag-template" => Ok(TargetStyle::TagTemplate),
            other => Err(CodeloomError::Config(format!(
                "unknown target style `{other}` (expected component-call or tag-template)"
            ))),
        }
    }
}

pub struct RenderRequest<'a> {
    pub schema: &'a MappingSchema,
    pub evidence: &'a ComponentEvidence,
    pub style: TargetStyle,
    pub surface: Option<&'a PropSurface>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub code: String,
    /// Set when import resolution kept an unverified best-guess path.
    pub import_warning: Option<String>,
}

#[derive(Debug, Clone)]
struct DerivedProp {
    name: String,
    figma_key: String,
    kind: MappingKind,
    value_mapping: Option<BTreeMap<String, Value>>,
    example: Option<Value>,
    default_value: Option<Value>,
    side: SlotSide,
    /// Name of the boolean prop guarding this instance's inclusion.
    gate: Option<String>,
}

pub struct Renderer<'a> {
    heuristics: &'a Heuristics,
    resolver: Option<&'a ImportResolver>,
}

impl<'a> Renderer<'a> {
    pub fn new(heuristics: &'a Heuristics) -> Self {
        Self {
            heuristics,
            resolver: None,
        }
    }

    /// Attach filesystem-backed import resolution. Without it the schema's
    /// candidate path is used verbatim.
    pub fn with_resolver(mut self, resolver: &'a ImportResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn render(&self, request: &RenderRequest) -> Rendered {
        let mut props = self.reconcile(request);
        self.sanitize_and_coerce(&mut props, request.surface);
        assign_gates(&mut props);

        let (specifier, import_warning) = match self.resolver {
            Some(resolver) => {
                let resolved = resolver.resolve(&request.schema.import_path);
                (resolved.specifier, resolved.warning)
            }
            None => (request.schema.import_path.clone(), None),
        };

        Rendered {
            code: self.emit(request, &props, &specifier),
            import_warning,
        }
    }

    /// Derive the authoritative prop list from evidence, adopting the
    /// schema's code-facing names where it mapped the same key.
    fn reconcile(&self, request: &RenderRequest) -> Vec<DerivedProp> {
        let schema = request.schema;
        let evidence = request.evidence;
        let mut props: Vec<DerivedProp> = Vec::new();
        let mut used: BTreeSet<String> = BTreeSet::new();

        // One enum prop per variant axis, pseudo-state axes excluded.
        for (axis_key, axis) in &evidence.variant_axes {
            if self.heuristics.is_pseudo_state_axis(axis_key)
                && !surface_references(request.surface, axis_key)
            {
                debug!(axis = axis_key.as_str(), "pseudo-state axis not rendered");
                continue;
            }
            let schema_prop = schema.prop_for_key(&axis.label);
            let boolean_requested =
                schema_prop.is_some_and(|p| p.kind == MappingKind::Boolean);
            let (kind, value_mapping) =
                if boolean_requested && self.heuristics.is_boolean_pair(&axis.values) {
                    (MappingKind::Boolean, None)
                } else {
                    let mapping = schema_prop
                        .and_then(|p| p.value_mapping.clone())
                        .unwrap_or_else(|| default_enum_mapping(axis));
                    (MappingKind::Enum, Some(mapping))
                };
            let name = schema_prop
                .map(|p| p.name.clone())
                .unwrap_or_else(|| axis_key.clone());
            props.push(DerivedProp {
                example: schema.example_props.get(&name).cloned(),
                name,
                figma_key: axis.label.clone(),
                kind,
                value_mapping,
                default_value: None,
                side: SlotSide::Middle,
                gate: None,
            });
            used.insert(axis_key.clone());
        }

        // One boolean/string/instance prop per declared property.
        for property in &evidence.component_properties {
            let kind = match property.kind {
                PropertyKind::Boolean => MappingKind::Boolean,
                PropertyKind::Text => MappingKind::String,
                PropertyKind::InstanceSwap => MappingKind::Instance,
                // No mapping kind exists for numbers.
                PropertyKind::Number => continue,
            };
            if self.heuristics.is_interaction_flag(&property.name)
                && !surface_references(
                    request.surface,
                    &ident::sanitize_identifier(&property.name),
                )
            {
                debug!(property = property.name.as_str(), "interaction flag not rendered");
                continue;
            }
            let schema_prop = schema.prop_for_key(&property.name);
            let name = schema_prop
                .map(|p| p.name.clone())
                .unwrap_or_else(|| ident::camel_case(&property.name));
            props.push(DerivedProp {
                example: schema.example_props.get(&name).cloned(),
                name,
                figma_key: property.name.clone(),
                kind,
                value_mapping: None,
                default_value: property.default_value.clone(),
                side: SlotSide::Middle,
                gate: None,
            });
            used.insert(ident::camel_case(&property.name));
        }

        // Schema props the evidence corroborates through layers or the prop
        // surface. A text prop with no backing on either side is never
        // invented.
        for prop in &schema.props {
            let normalized = ident::camel_case(&prop.figma_key);
            if used.contains(&normalized) {
                continue;
            }
            let keep = match prop.kind {
                MappingKind::TextContent => evidence.text_layer(&prop.figma_key).is_some(),
                MappingKind::Children => {
                    prop.figma_key == "*" || evidence.slot_layer(&prop.figma_key).is_some()
                }
                MappingKind::String => {
                    self.heuristics.is_text_vocabulary(&prop.figma_key)
                        && request
                            .surface
                            .is_some_and(|s| s.contains_ci(&prop.figma_key))
                }
                _ => false,
            };
            if !keep {
                continue;
            }
            props.push(DerivedProp {
                name: prop.name.clone(),
                figma_key: prop.figma_key.clone(),
                kind: prop.kind,
                value_mapping: prop.value_mapping.clone(),
                example: schema.example_props.get(&prop.name).cloned(),
                default_value: None,
                side: SlotSide::Middle,
                gate: None,
            });
            used.insert(normalized);
        }

        props
    }

    /// Strip flag syntax down to bare identifiers and, when the surface has
    /// exactly one unambiguous keyword match for a name it lacks, adopt the
    /// surface's real name. Both conditions must hold or the name stays.
    fn sanitize_and_coerce(&self, props: &mut Vec<DerivedProp>, surface: Option<&PropSurface>) {
        for prop in props.iter_mut() {
            let mut name = ident::sanitize_identifier(&prop.name);
            if name.is_empty() {
                name = ident::sanitize_identifier(&prop.figma_key);
            }
            let side = match self.heuristics.classify_side(&name) {
                SlotSide::Middle => self.heuristics.classify_side(&prop.figma_key),
                side => side,
            };
            if let Some(surface) = surface {
                if !name.is_empty() && !surface.contains(&name) {
                    let target = match side {
                        SlotSide::Left => surface
                            .unique_match(|p| self.heuristics.classify_side(p) == SlotSide::Left),
                        SlotSide::Right => surface
                            .unique_match(|p| self.heuristics.classify_side(p) == SlotSide::Right),
                        SlotSide::Middle => {
                            if prop.kind == MappingKind::Instance
                                || self.heuristics.is_icon_like(&name)
                            {
                                surface.unique_match(|p| self.heuristics.is_icon_like(p))
                            } else {
                                None
                            }
                        }
                    };
                    if let Some(target) = target {
                        debug!(from = name.as_str(), to = target, "coerced prop onto surface name");
                        name = target.to_string();
                    }
                }
            }
            prop.name = name;
            prop.side = side;
        }
        props.retain(|p| !p.name.is_empty());
    }

    fn emit(&self, request: &RenderRequest, props: &[DerivedProp], specifier: &str) -> String {
        let component = request.schema.component.as_str();
        let mut out = String::new();

        match request.style {
            TargetStyle::ComponentCall => {
                out.push_str(&format!("import {{ {component} }} from \"{specifier}\";\n\n"));
                out.push_str(&format!("figma.connect({component}, {{\n"));
            }
            TargetStyle::TagTemplate => {
                out.push_str(&format!("import \"{specifier}\";\n\n"));
                out.push_str(&format!("figma.connect(\"{component}\", {{\n"));
            }
        }

        if props.is_empty() {
            out.push_str("  props: {},\n");
        } else {
            out.push_str("  props: {\n");
            for prop in props {
                out.push_str(&format!(
                    "    {}: {},\n",
                    object_key(&prop.name),
                    helper_call(prop)
                ));
            }
            out.push_str("  },\n");
        }

        out.push_str(&example_block(request.style, component, props));
        out.push_str("});\n");
        out
    }
}

/// `hasIcon` gates `icon`: a presence flag plus optional content render as
/// a conditional include rather than an unconditional splice.
fn assign_gates(props: &mut [DerivedProp]) {
    let booleans: Vec<String> = props
        .iter()
        .filter(|p| p.kind == MappingKind::Boolean)
        .map(|p| p.name.clone())
        .collect();
    for prop in props.iter_mut() {
        if prop.kind != MappingKind::Instance {
            continue;
        }
        let base = prop.name.to_lowercase();
        prop.gate = booleans
            .iter()
            .find(|b| {
                let lower = b.to_lowercase();
                lower == format!("has{base}")
                    || lower == format!("show{base}")
                    || lower == format!("{base}visible")
            })
            .cloned();
    }
}

fn default_enum_mapping(axis: &VariantAxis) -> BTreeMap<String, Value> {
    axis.values
        .iter()
        .map(|v| (v.clone(), Value::String(ident::enum_token(v))))
        .collect()
}

/// Bare identifiers go unquoted as object keys; everything else is quoted.
fn object_key(name: &str) -> String {
    if ident::is_bare_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.escape_default())
    }
}

fn literal(value: &Value) -> String {
    value.to_string()
}

fn helper_call(prop: &DerivedProp) -> String {
    match prop.kind {
        MappingKind::Enum => {
            let mut call = format!("figma.enum(\"{}\", {{\n", prop.figma_key);
            if let Some(mapping) = &prop.value_mapping {
                for (design_value, code_value) in mapping {
                    call.push_str(&format!(
                        "      {}: {},\n",
                        object_key(design_value),
                        literal(code_value)
                    ));
                }
            }
            call.push_str("    })");
            call
        }
        MappingKind::Boolean => format!("figma.boolean(\"{}\")", prop.figma_key),
        MappingKind::String => format!("figma.string(\"{}\")", prop.figma_key),
        MappingKind::Instance => format!("figma.instance(\"{}\")", prop.figma_key),
        MappingKind::TextContent => format!("figma.textContent(\"{}\")", prop.figma_key),
        MappingKind::Children => format!("figma.children(\"{}\")", prop.figma_key),
    }
}

/// Literal default for the destructured prop bag: schema example value,
/// else evidence default, else a kind-appropriate fallback.
fn default_literal(prop: &DerivedProp) -> Option<String> {
    if let Some(example) = &prop.example {
        return Some(literal(example));
    }
    if let Some(default) = &prop.default_value {
        return Some(literal(default));
    }
    match prop.kind {
        MappingKind::Enum => prop
            .value_mapping
            .as_ref()
            .and_then(|m| m.values().next())
            .map(literal),
        MappingKind::Boolean => Some("false".to_string()),
        MappingKind::String | MappingKind::TextContent => Some(format!(
            "\"{}\"",
            ident::title_from_ident(&prop.name).escape_default()
        )),
        MappingKind::Instance | MappingKind::Children => None,
    }
}

fn destructure(props: &[DerivedProp]) -> String {
    if props.is_empty() {
        return "()".to_string();
    }
    let entries: Vec<String> = props
        .iter()
        .map(|p| match default_literal(p) {
            Some(default) => format!("{} = {}", p.name, default),
            None => p.name.clone(),
        })
        .collect();
    format!("({{ {} }})", entries.join(", "))
}

/// Whether this prop renders inside the element body rather than as an
/// attribute.
fn is_body_prop(prop: &DerivedProp) -> bool {
    match prop.kind {
        MappingKind::Children | MappingKind::TextContent | MappingKind::Instance => true,
        MappingKind::String => prop.name == "children",
        _ => false,
    }
}

fn example_block(style: TargetStyle, component: &str, props: &[DerivedProp]) -> String {
    let gating: BTreeSet<&str> = props.iter().filter_map(|p| p.gate.as_deref()).collect();

    let attributes: Vec<String> = props
        .iter()
        .filter(|p| !is_body_prop(p))
        .filter(|p| !(p.kind == MappingKind::Boolean && gating.contains(p.name.as_str())))
        .map(|p| match style {
            TargetStyle::ComponentCall => format!("{}={{{}}}", p.name, p.name),
            TargetStyle::TagTemplate => {
                if p.kind == MappingKind::Boolean {
                    format!("?{}=${{{}}}", p.name, p.name)
                } else {
                    format!("{}=${{{}}}", p.name, p.name)
                }
            }
        })
        .collect();

    let mut left: Vec<String> = Vec::new();
    let mut middle: Vec<String> = Vec::new();
    let mut primary: Vec<String> = Vec::new();
    let mut right: Vec<String> = Vec::new();
    for prop in props.iter().filter(|p| is_body_prop(p)) {
        let expr = body_expr(style, prop);
        match prop.kind {
            MappingKind::Instance => match prop.side {
                SlotSide::Left => left.push(expr),
                SlotSide::Middle => middle.push(expr),
                SlotSide::Right => right.push(expr),
            },
            _ => primary.push(expr),
        }
    }
    let body: Vec<String> = left
        .into_iter()
        .chain(middle)
        .chain(primary)
        .chain(right)
        .collect();

    let attrs = if attributes.is_empty() {
        String::new()
    } else {
        format!(" {}", attributes.join(" "))
    };
    let params = destructure(props);

    match style {
        TargetStyle::ComponentCall => {
            if body.is_empty() {
                format!(
                    "  example: {params} => (\n    <{component}{attrs} />\n  ),\n"
                )
            } else {
                let lines: String = body
                    .iter()
                    .map(|item| format!("      {item}\n"))
                    .collect();
                format!(
                    "  example: {params} => (\n    <{component}{attrs}>\n{lines}    </{component}>\n  ),\n"
                )
            }
        }
        TargetStyle::TagTemplate => {
            if body.is_empty() {
                format!(
                    "  example: {params} => html`<{component}{attrs}></{component}>`,\n"
                )
            } else {
                let lines: String = body
                    .iter()
                    .map(|item| format!("      {item}\n"))
                    .collect();
                format!(
                    "  example: {params} => html`\n    <{component}{attrs}>\n{lines}    </{component}>\n  `,\n"
                )
            }
        }
    }
}

fn body_expr(style: TargetStyle, prop: &DerivedProp) -> String {
    match (style, &prop.gate) {
        (TargetStyle::ComponentCall, Some(gate)) => format!("{{{} && {}}}", gate, prop.name),
        (TargetStyle::ComponentCall, None) => format!("{{{}}}", prop.name),
        (TargetStyle::TagTemplate, Some(gate)) => {
            format!("${{{} ? {} : \"\"}}", gate, prop.name)
        }
        (TargetStyle::TagTemplate, None) => format!("${{{}}}", prop.name),
    }
}
