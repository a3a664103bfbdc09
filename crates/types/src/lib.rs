pub mod event;
pub mod format;
pub mod pool;
pub mod swap;
pub mod token;
pub mod transaction;

pub use event::*;
pub use format::*;
pub use pool::*;
pub use swap::*;
pub use token::*;
pub use transaction::*;

/// Swap fee retained by the pool, in basis points
pub const POOL_FEE_BPS: u32 = 30;
