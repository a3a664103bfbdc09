pub mod backoff;
pub mod retry;

pub use backoff::*;
pub use retry::*;
