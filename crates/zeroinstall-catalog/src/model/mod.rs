//! Domain types: drafts, canonical methods, candidates, decisions.

pub mod candidate;
pub mod decision;
pub mod method;

pub use candidate::*;
pub use decision::*;
pub use method::*;
