pub mod claude;
pub mod prompt;
pub mod traits;
mod wire;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use claude::ClaudeProposer;
pub use traits::{AttemptFeedback, ProposalContext, ProposalResponse, ProposalSource, SourceFile};
