//! Domain layer for the Vitrin catalog authoring assistant.
//!
//! This crate defines the product draft model, the per-conversation session
//! contract, the closed tool-request set, and the narrow interfaces to the
//! external collaborators (commerce store, content generator, messaging
//! transport, settings). It contains no I/O; concrete backends live in
//! `vitrin-infrastructure`.

pub mod commerce;
pub mod draft;
pub mod error;
pub mod fetch;
pub mod generation;
pub mod intent;
pub mod messaging;
pub mod session;
pub mod settings;
pub mod tool;
pub mod turn;

// Re-export common error type
pub use error::{Result, VitrinError};
