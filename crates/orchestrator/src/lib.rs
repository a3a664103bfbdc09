pub mod collaborators;
pub mod orchestrator;
pub mod policy;
pub mod summary;

#[cfg(test)]
mod tests;

// Re-export main types
pub use collaborators::{BalanceRefresher, RefreshError, SubmitError, SwapSubmitter};
pub use orchestrator::{
    BatchError, BatchSwapOrchestrator, BatchSwapOrchestratorBuilder, BuilderError,
};
pub use policy::BatchPolicy;
pub use summary::{BatchSummary, SkippedSwap, SwapError, SwapOutcome};
