mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_assemble_plan, build_segment_plan};
pub use models::AssemblePlan;
