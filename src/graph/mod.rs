//! Typed views over the two JSON documents embedded in image metadata.
pub mod node;
pub mod value;
pub mod workflow;

pub use node::*;
pub use value::*;
pub use workflow::*;
