//! Transaction lifecycle tracking
//!
//! Every swap is recorded under a locally generated placeholder before the
//! ledger knows about it, promoted to its real hash once submitted, then
//! confirmed, polled, or reconciled by the background sweep.

pub mod error;
pub mod ledger;
pub mod store;
pub mod sweep;
pub mod tracker;

pub use error::*;
pub use ledger::*;
pub use store::*;
pub use sweep::*;
pub use tracker::*;
