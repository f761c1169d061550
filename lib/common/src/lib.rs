pub mod error;
mod quad_source;

pub use quad_source::{QuadSource, QuadSourceExt};
