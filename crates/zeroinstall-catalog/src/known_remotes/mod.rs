//! Known remotes: well-known servers that always offer a hosted HTTP endpoint.

pub mod apply;
pub mod default;
pub mod load;
pub mod types;

pub use apply::*;
pub use load::*;
pub use types::*;
