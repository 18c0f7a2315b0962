use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AssemblePlan, SegmentPlan};
use crate::cli::{AssembleArgs, SegmentArgs};
use crate::error::{CliError, Result};
use bigfold::engine::config::{AssemblyConfigBuilder, SegmentationConfigBuilder};
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// Resolves the `segment` settings: CLI flags, then `--set`, then the file,
/// then built-in defaults.
pub fn build_segment_plan(args: &SegmentArgs) -> Result<SegmentPlan> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::load(args.config.as_deref())?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;
    let section = file_config.segmentation.take().unwrap_or_default();

    let segment_length = args
        .segment_length
        .or(section.segment_length)
        .unwrap_or(defaults.segment_length);
    let overlap_length = args
        .overlap_length
        .or(section.overlap_length)
        .unwrap_or(defaults.overlap_length);
    let line_width = args
        .line_width
        .or(section.line_width)
        .unwrap_or(defaults.line_width);

    let core_config = SegmentationConfigBuilder::new()
        .segment_length(segment_length)
        .overlap_length(overlap_length)
        .line_width(line_width)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;
    debug!(?core_config, "Resolved segmentation configuration.");

    Ok(SegmentPlan {
        input_path: args.input.clone(),
        output_dir: args.output_dir.clone(),
        core_config,
    })
}

/// Resolves the `assemble` settings with the same precedence as
/// [`build_segment_plan`]. The overlap falls back to the segmentation section
/// so a single file can drive both commands.
pub fn build_assemble_plan(args: &AssembleArgs) -> Result<AssemblePlan> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::load(args.config.as_deref())?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;
    let segmentation = file_config.segmentation.take().unwrap_or_default();
    let section = file_config.assembly.take().unwrap_or_default();

    let overlap_length = args
        .overlap_length
        .or(section.overlap_length)
        .or(segmentation.overlap_length)
        .unwrap_or(defaults.overlap_length);
    let align_span = args
        .align_span
        .or(section.align_span)
        .unwrap_or(defaults.align_span);
    let combine = args
        .combine
        .as_override()
        .or(section.combine)
        .unwrap_or(defaults.combine);
    let chain_id = args
        .chain_id
        .or(section.chain_id)
        .unwrap_or(defaults.chain_id);
    let short_fragment_policy = args
        .short_fragment_policy
        .or(section.short_fragment_policy)
        .unwrap_or(defaults.short_fragment_policy);

    let core_config = AssemblyConfigBuilder::new()
        .overlap_length(overlap_length)
        .align_span(align_span)
        .combine(combine)
        .chain_id(chain_id)
        .short_fragment_policy(short_fragment_policy)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;
    debug!(?core_config, "Resolved assembly configuration.");

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.pdb", args.prefix)));

    Ok(AssemblePlan {
        prefix: args.prefix.clone(),
        input_dir: args.input_dir.clone(),
        output_path,
        report_path: args.report.clone(),
        core_config,
    })
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        CliError::Config(format!("Invalid value for {}: '{}' ({})", key, value, e))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "segmentation.segment-length" => {
                config
                    .segmentation
                    .get_or_insert_with(Default::default)
                    .segment_length = Some(parse_value(key, value)?);
            }
            "segmentation.overlap-length" => {
                config
                    .segmentation
                    .get_or_insert_with(Default::default)
                    .overlap_length = Some(parse_value(key, value)?);
            }
            "segmentation.line-width" => {
                config
                    .segmentation
                    .get_or_insert_with(Default::default)
                    .line_width = Some(parse_value(key, value)?);
            }
            "assembly.overlap-length" => {
                config
                    .assembly
                    .get_or_insert_with(Default::default)
                    .overlap_length = Some(parse_value(key, value)?);
            }
            "assembly.align-span" => {
                config.assembly.get_or_insert_with(Default::default).align_span =
                    Some(parse_value(key, value)?);
            }
            "assembly.combine" => {
                config.assembly.get_or_insert_with(Default::default).combine =
                    Some(parse_value(key, value)?);
            }
            "assembly.chain-id" => {
                config.assembly.get_or_insert_with(Default::default).chain_id =
                    Some(parse_value(key, value)?);
            }
            "assembly.short-fragment-policy" => {
                config
                    .assembly
                    .get_or_insert_with(Default::default)
                    .short_fragment_policy = Some(parse_value(key, value)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
