//! Session persistence contract.

mod store;

pub use store::SessionStore;
