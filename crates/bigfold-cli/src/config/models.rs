use bigfold::engine::config::{AssemblyConfig, SegmentationConfig};
use std::path::PathBuf;

/// Everything the `segment` command needs once configuration is resolved.
#[derive(Debug)]
pub struct SegmentPlan {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub core_config: SegmentationConfig,
}

/// Everything the `assemble` command needs once configuration is resolved.
#[derive(Debug)]
pub struct AssemblePlan {
    pub prefix: String,
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub report_path: Option<PathBuf>,
    pub core_config: AssemblyConfig,
}
