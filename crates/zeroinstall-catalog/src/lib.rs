pub mod aggregate;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod infer;
pub mod known_remotes;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod proposer;
pub mod runner;
pub mod sink;
pub mod sources;
