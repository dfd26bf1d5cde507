pub mod exit_orchestrator;
pub mod extension;
pub mod state;

pub use exit_orchestrator::{ExitContext, ExitOrchestrator, ExitTrigger, PositionDecision};
pub use extension::{NoExtension, PositionExtension};
pub use state::{EntryBlock, PositionStatus, StrategyState};
