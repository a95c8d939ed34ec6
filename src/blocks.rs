//! Convenient mod collecting all blocks for easy importing.
pub use crate::buggy_sink::BuggySink;
pub use crate::head::Head;
pub use crate::vector_source::{VectorSource, VectorSourceBuilder};
