use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use codeloom_common::types::PropertyKind;

/// Raw design tree node as delivered by the scanner collaborator.
///
/// A closed union over the node types evidence extraction cares about;
/// anything else in the payload is rejected at parse time rather than
/// carried around as an untyped bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DesignNode {
    #[serde(rename_all = "camelCase")]
    Text {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        characters: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Frame {
        name: String,
        #[serde(default)]
        children: Vec<DesignNode>,
    },
    #[serde(rename_all = "camelCase")]
    Group {
        name: String,
        #[serde(default)]
        children: Vec<DesignNode>,
    },
    #[serde(rename_all = "camelCase")]
    Instance {
        name: String,
        #[serde(default)]
        children: Vec<DesignNode>,
    },
    /// A single variant inside a component set; its name encodes the
    /// `key=value, key=value` axis assignment.
    #[serde(rename_all = "camelCase")]
    Component {
        name: String,
        #[serde(default)]
        children: Vec<DesignNode>,
    },
    #[serde(rename_all = "camelCase")]
    ComponentSet {
        id: String,
        name: String,
        #[serde(default)]
        children: Vec<DesignNode>,
        #[serde(default)]
        component_property_definitions: BTreeMap<String, PropertyDefinition>,
    },
}

impl DesignNode {
    pub fn name(&self) -> &str {
        match self {
            DesignNode::Text { name, .. }
            | DesignNode::Frame { name, .. }
            | DesignNode::Group { name, .. }
            | DesignNode::Instance { name, .. }
            | DesignNode::Component { name, .. }
            | DesignNode::ComponentSet { name, .. } => name,
        }
    }

    pub fn children(&self) -> &[DesignNode] {
        match self {
            DesignNode::Text { .. } => &[],
            DesignNode::Frame { children, .. }
            | DesignNode::Group { children, .. }
            | DesignNode::Instance { children, .. }
            | DesignNode::Component { children, .. }
            | DesignNode::ComponentSet { children, .. } => children,
        }
    }
}

/// Declared property type in the raw payload. `Variant` entries are axis
/// definitions and never become component properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawPropertyType {
    Boolean,
    Text,
    InstanceSwap,
    Number,
    Variant,
}

impl RawPropertyType {
    pub fn as_property_kind(self) -> Option<PropertyKind> {
        match self {
            RawPropertyType::Boolean => Some(PropertyKind::Boolean),
            RawPropertyType::Text => Some(PropertyKind::Text),
            RawPropertyType::InstanceSwap => Some(PropertyKind::InstanceSwap),
            RawPropertyType::Number => Some(PropertyKind::Number),
            RawPropertyType::Variant => None,
        }
    }
}

/// One entry of a component set's own property-definition map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    #[serde(rename = "type")]
    pub kind: RawPropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}
