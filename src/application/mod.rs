//! Application layer - orchestration of domain logic.
//!
//! This layer wires the domain pieces into the running log adapter:
//! - Bucket registry (one token bucket per format key)
//! - Rate limiter (allow or suppress decisions)
//! - Rewrite publisher (the live peer rewrite table)
//! - Pipeline (filter, rewrite, throttle)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod config;
pub mod limiter;
pub mod pipeline;
pub mod ports;
pub mod publisher;
pub mod registry;
