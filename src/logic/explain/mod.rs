//! Feature attribution for the loaded classifier.

mod engine;
mod path;
mod values;

pub use engine::TreeExplainer;
pub use path::PathState;
pub use values::ShapValues;
