//! Contains the storage layer of ontoquad.
//!
//! The primary type of this crate is the [MemQuadStore], an in-memory quad store that maintains
//! one index per quad position. A [Federation] combines multiple data sources into a single one.

mod federation;
mod index;
mod register;
mod store;

pub use federation::Federation;
pub use store::{MemQuadStore, QuadFlavor};
