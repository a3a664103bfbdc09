//! Batch swap session
//!
//! Wires configuration, quoting, transaction tracking and the batch
//! orchestrator into one owned [`SwapSession`] per connected account.

pub mod balances;
pub mod error;
pub mod session;
pub mod settings;

pub use balances::{BalanceReader, SessionBalanceRefresher, SessionState, SwapSelection};
pub use error::SessionError;
pub use session::{SwapSession, SwapSessionBuilder};
pub use settings::{batch_policy, impact_change_threshold, tracker_config};
