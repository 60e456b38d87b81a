pub mod checksum;
pub mod extractor;
pub mod node;

pub use extractor::{is_hidden_component, Extractor, DEFAULT_LAYER_DEPTH};
pub use node::{DesignNode, PropertyDefinition, RawPropertyType};
