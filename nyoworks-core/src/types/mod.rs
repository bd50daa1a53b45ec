mod lease;
mod primitives;
mod project;

pub use lease::*;
pub use primitives::*;
pub use project::*;
