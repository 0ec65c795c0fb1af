//! slidesmith: Slide-Deck Template Population
//!
//! Reads a JSON content document and brings a remote presentation in line
//! with it: missing slides are created, text is replaced, and images are
//! generated, stored, and swapped in. Mutations go out as rate-limited
//! atomic batches, and per-element failures are counted rather than fatal.

pub mod cli;
pub mod config;
pub mod credentials;
pub mod document;
pub mod error;
pub mod executor;
pub mod http;
pub mod image;
pub mod logging;
pub mod orchestrator;
pub mod planner;
pub mod rate_limit;
pub mod retry;
pub mod slides;
