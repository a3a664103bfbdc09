pub mod engine;
pub mod error;
pub mod pool;
pub mod service;

pub use engine::*;
pub use error::*;
pub use pool::*;
pub use service::*;
