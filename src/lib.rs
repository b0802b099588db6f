//! Host-side plumbing for the nocturne engine.
//!
//! The engine itself lives in `nocturne_core` and only speaks to the world
//! through its port traits. This crate provides the synthetic host used by
//! the headless binary and the integration tests.

pub mod sim;

pub use nocturne_core::{AgentView, Engine, Ports};
