pub mod imports;
pub mod renderer;
pub mod surface;
pub mod validator;

#[cfg(test)]
mod renderer_tests;

pub use imports::{ImportResolver, ResolvedImport};
pub use renderer::{RenderRequest, Rendered, Renderer, TargetStyle};
pub use surface::PropSurface;
pub use validator::Validator;
