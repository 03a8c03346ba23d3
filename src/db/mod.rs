//! Local entity store and the upsert layer that feeds it.

pub mod store;
pub mod upsert;

pub use store::{EntityStore, SharedStore};
