pub mod config;
pub mod error;
pub mod heuristics;
pub mod ident;
pub mod types;

pub use config::Config;
pub use error::CodeloomError;
pub use heuristics::{Heuristics, SlotSide};
pub use types::*;
