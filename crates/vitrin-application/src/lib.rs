//! The conversational authoring orchestrator.
//!
//! One turn flows: load the session draft, pick a scenario from the draft
//! and the incoming input, run zero or more tools against the working copy,
//! persist (or delete) the session, return a reply string. Tools never
//! touch the store and never let errors escape; every failure degrades to a
//! reply so the conversation stays usable.

pub mod extract;
pub mod intent;
pub mod orchestrator;
pub mod scenario;
pub mod tools;

#[cfg(test)]
mod orchestrator_test;

pub use orchestrator::Orchestrator;
pub use tools::Collaborators;
