//! Command normalizer: tokenizes command strings using a per-tool flag
//! knowledge base.

pub mod command;
pub mod flags;

pub use command::*;
pub use flags::*;
